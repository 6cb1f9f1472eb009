use serde::{Deserialize, Serialize};

/// 语料片段
///
/// 启动时由语料切分得到，之后不再修改。`position` 即其在片段序列中的下标，
/// 与向量索引中的行号一一对应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub position: usize,
    pub text: String,
}

impl Fragment {
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }

    /// 片段的字符数
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
