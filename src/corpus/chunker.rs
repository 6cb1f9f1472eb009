//! 定长字符切分

use std::path::Path;

use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::Fragment;

/// 默认片段长度（字符）
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// 读取语料文件并切分
///
/// 文件无法读取时返回 [`AppError::CorpusNotFound`]，调用方应视为启动失败。
pub fn load_and_chunk(path: impl AsRef<Path>, chunk_size: usize) -> Result<Vec<Fragment>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| AppError::CorpusNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let fragments = chunk_text(&text, chunk_size)?;
    info!(
        "Corpus loaded from {}: {} chars, {} fragments",
        path.display(),
        text.chars().count(),
        fragments.len()
    );

    Ok(fragments)
}

/// 将文本按 `chunk_size` 个字符切分为互不重叠的片段
///
/// 每段去掉首尾空白，去空白后为空的片段被丢弃；片段顺序与原文一致。
pub fn chunk_text(text: &str, chunk_size: usize) -> Result<Vec<Fragment>> {
    if chunk_size == 0 {
        return Err(AppError::Validation(
            "chunk_size must be greater than 0".to_string(),
        ));
    }

    let mut fragments = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            push_trimmed(&mut fragments, &text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        push_trimmed(&mut fragments, &text[start..]);
    }

    debug!(chunk_size, fragments = fragments.len(), "Text chunked");
    Ok(fragments)
}

fn push_trimmed(fragments: &mut Vec<Fragment>, window: &str) {
    let trimmed = window.trim();
    if !trimmed.is_empty() {
        fragments.push(Fragment::new(fragments.len(), trimmed));
    }
}
