//! 服务模块

pub mod generator;
pub mod memory;
pub mod prompt;
pub mod retrieval;

pub use generator::ResponseGenerator;
pub use memory::{BoundedBuffer, ConversationMemory};
pub use retrieval::{RetrievalService, create_retrieval_service};
