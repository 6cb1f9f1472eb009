//! RoastBot - 检索增强的吐槽聊天服务
//!
//! 启动时把静态语料切分、嵌入并建立精确向量索引；每条用户消息检索最相近的片段，
//! 连同最近几轮对话一起交给语言模型生成回复。

pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod llm;
pub mod models;
pub mod observability;
pub mod services;
