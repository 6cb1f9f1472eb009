use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// API 密钥的后备环境变量
pub const API_KEY_ENV: &str = "NVIDIA_API_KEY";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 搜索顺序（后者覆盖前者）：
    /// 1. 内置默认值
    /// 2. ./config.toml
    /// 3. ROASTBOT_ 前缀的环境变量（层级用 `__` 分隔）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        let mut config: AppConfig = Self::figment(path.as_ref()).extract()?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var(API_KEY_ENV).ok();
        }

        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ROASTBOT_").split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.corpus.chunk_size == 0 {
            return Err(ConfigValidationError::InvalidChunkSize);
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigValidationError::InvalidDimension);
        }

        if config.retrieval.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK);
        }

        if config.memory.capacity == 0 {
            return Err(ConfigValidationError::InvalidMemoryCapacity);
        }

        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(
                config.llm.temperature,
            ));
        }

        if config.llm.max_tokens == 0 {
            return Err(ConfigValidationError::InvalidMaxTokens);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("片段长度无效，必须大于 0")]
    InvalidChunkSize,

    #[error("向量维度无效，必须大于 0")]
    InvalidDimension,

    #[error("检索数量 top_k 无效，必须大于 0")]
    InvalidTopK,

    #[error("对话记忆容量无效，必须大于 0")]
    InvalidMemoryCapacity,

    #[error("采样温度 {0} 超出范围 [0, 2]")]
    InvalidTemperature(f32),

    #[error("最大输出 token 数无效，必须大于 0")]
    InvalidMaxTokens,
}

impl From<ConfigValidationError> for crate::error::AppError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::AppError::Config(e.to_string())
    }
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults() {
        assert!(ConfigLoader::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = AppConfig::default();
        config.corpus.chunk_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidChunkSize)
        ));

        let mut config = AppConfig::default();
        config.memory.capacity = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidMemoryCapacity)
        ));

        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidTopK)
        ));
    }

    #[test]
    fn test_validate_rejects_temperature_out_of_range() {
        let mut config = AppConfig::default();
        config.llm.temperature = 2.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn test_load_from_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "roastbot.toml",
                r#"
                app_name = "roastbot-test"

                [corpus]
                chunk_size = 42

                [llm]
                api_key = "from-file"
                "#,
            )?;
            jail.set_env("ROASTBOT_MEMORY__CAPACITY", "3");

            let config = ConfigLoader::load_from("roastbot.toml")
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.app_name, "roastbot-test");
            assert_eq!(config.corpus.chunk_size, 42);
            assert_eq!(config.memory.capacity, 3);
            assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
            assert_eq!(config.retrieval.top_k, 1);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env(API_KEY_ENV, "nvapi-test");

            let config = ConfigLoader::load_from("does-not-exist.toml")
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.corpus.chunk_size, 100);
            assert_eq!(config.llm.api_key.as_deref(), Some("nvapi-test"));
            Ok(())
        });
    }
}
