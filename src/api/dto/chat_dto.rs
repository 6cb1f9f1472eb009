//! 聊天 DTO
//!
//! 定义聊天相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};

use crate::models::{ConversationTurn, MemoryEntry};

/// 发送消息请求
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    /// 用户输入
    pub message: String,
}

/// 发送消息响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// 展示给用户的回复
    pub reply: String,
    /// 生成是否失败（失败时 reply 为提示文本）
    pub failed: bool,
}

/// 展示记录响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<ConversationTurn>,
    pub total: usize,
}

/// 对话记忆响应
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub capacity: usize,
    pub entries: Vec<MemoryEntry>,
}
