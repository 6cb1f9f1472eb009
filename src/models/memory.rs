use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一次完整的对话交换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// 用户消息
    pub user_message: String,
    /// 机器人回复
    pub bot_reply: String,
    /// 记录时间
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(user_message: impl Into<String>, bot_reply: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            bot_reply: bot_reply.into(),
            created_at: Utc::now(),
        }
    }
}
