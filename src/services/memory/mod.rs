//! 对话记忆
//!
//! 进程内唯一的对话流，只保留最近几轮交换，用于提示词。
//! 每个操作各自加锁；并发的交换按到达顺序交错，不做会话隔离。

pub mod buffer;

pub use buffer::BoundedBuffer;

use parking_lot::Mutex;
use tracing::debug;

use crate::models::MemoryEntry;

/// 默认保留的交换轮数
pub const DEFAULT_MEMORY_CAPACITY: usize = 5;

/// 记忆为空时的占位文本
pub const EMPTY_MEMORY_PLACEHOLDER: &str = "No previous conversation.";

pub struct ConversationMemory {
    entries: Mutex<BoundedBuffer<MemoryEntry>>,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(BoundedBuffer::new(capacity)),
        }
    }

    pub fn add_to_memory(&self, user_msg: &str, bot_msg: &str) {
        let evicted = self
            .entries
            .lock()
            .push(MemoryEntry::new(user_msg, bot_msg));

        if let Some(entry) = evicted {
            debug!(
                evicted_at = %entry.created_at,
                "Oldest exchange evicted from memory"
            );
        }
    }

    /// 当前记忆的快照，从旧到新
    pub fn get_memory(&self) -> Vec<MemoryEntry> {
        self.entries.lock().snapshot()
    }

    pub fn clear_memory(&self) {
        self.entries.lock().clear();
    }

    /// 渲染为提示词中的对话历史
    pub fn format_memory(&self) -> String {
        let entries = self.entries.lock();
        if entries.is_empty() {
            return EMPTY_MEMORY_PLACEHOLDER.to_string();
        }

        entries
            .iter()
            .map(|entry| format!("User: {}\nRoastbot: {}", entry.user_message, entry.bot_reply))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().capacity()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}
