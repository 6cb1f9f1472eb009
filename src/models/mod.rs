//! 核心数据模型模块
//!
//! 定义 RoastBot 的核心数据结构：Fragment, MemoryEntry, ConversationTurn。

pub mod fragment;
pub mod memory;
pub mod turn;

pub use fragment::Fragment;
pub use memory::MemoryEntry;
pub use turn::{ConversationTurn, TurnRole};
