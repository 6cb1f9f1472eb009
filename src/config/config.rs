use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::corpus::DEFAULT_CHUNK_SIZE;
use crate::services::memory::DEFAULT_MEMORY_CAPACITY;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

/// 语料配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// 语料文件路径
    pub path: PathBuf,
    /// 每个片段的字符数
    pub chunk_size: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/roast_data.txt"),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// 嵌入模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding 后端类型: "hashing"、"ollama" 或 "openai"
    pub backend: String,
    /// 模型名称
    pub model_name: String,
    /// 远程服务地址
    pub base_url: String,
    /// 远程服务密钥（仅 openai 后端）
    pub api_key: Option<String>,
    /// 向量维度
    pub dimension: usize,
    /// 批处理大小
    pub batch_size: usize,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: "hashing".into(),
            model_name: "all-minilm".into(),
            base_url: "http://localhost:11434".into(),
            api_key: None,
            dimension: 384,
            batch_size: 32,
            timeout_secs: 60,
        }
    }
}

/// 语言模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI 兼容接口地址
    pub base_url: String,
    /// API 密钥，未配置时读取 NVIDIA_API_KEY
    pub api_key: Option<String>,
    /// 模型名称
    pub model_name: String,
    /// 采样温度
    pub temperature: f32,
    /// 最大输出 token 数
    pub max_tokens: u32,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://integrate.api.nvidia.com/v1".into(),
            api_key: None,
            model_name: "meta/llama-3.1-8b-instruct".into(),
            temperature: 0.7,
            max_tokens: 200,
            timeout_secs: 60,
        }
    }
}

/// 检索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// 每次检索返回的片段数
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 1 }
    }
}

/// 对话记忆配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// 最多保留的对话轮数
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub json: bool,
    /// 日志文件目录
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            log_dir: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 语料配置
    pub corpus: CorpusConfig,
    /// 嵌入模型配置
    pub embedding: EmbeddingConfig,
    /// 语言模型配置
    pub llm: LlmConfig,
    /// 检索配置
    pub retrieval: RetrievalConfig,
    /// 对话记忆配置
    pub memory: MemoryConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            corpus: CorpusConfig::default(),
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            retrieval: RetrievalConfig::default(),
            memory: MemoryConfig::default(),
            logging: LoggingConfig::default(),
            app_name: "roastbot".into(),
        }
    }
}
