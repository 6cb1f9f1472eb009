//! 语料模块
//!
//! 启动时读取静态语料并切分为固定长度的片段。

pub mod chunker;

pub use chunker::{DEFAULT_CHUNK_SIZE, chunk_text, load_and_chunk};
