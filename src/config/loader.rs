//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "PRECACHE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `PRECACHE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `PRECACHE_SERVER__PORT=8080`
/// - `PRECACHE_SPEECH__ENGINE=http`
/// - `PRECACHE_SPEECH__HTTP__URL=http://tts-server:8000/tts?text={{speakText}}`
/// - `PRECACHE_DOWNLOAD__THREAD_COUNT=8`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5070)?
        .set_default("speech.engine", "cloud")?
        .set_default("speech.speech_rate", 0)?
        .set_default("download.thread_count", 4)?
        .set_default("download.grace_period_ms", 1000)?
        .set_default("download.progress_interval_ms", 1000)?
        .set_default("download.expansion", "two_pass")?
        .set_default("storage.cache_dir", "data/speech")?
        .set_default("storage.books_dir", "data/books")?
        .set_default("database.path", "data/precache.db")?
        .set_default("database.max_connections", 5)?
        .set_default("log.level", "info")?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.download.thread_count == 0 {
        return Err(ConfigError::ValidationError(
            "Download thread count cannot be 0".to_string(),
        ));
    }

    if config.download.progress_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Progress interval cannot be 0".to_string(),
        ));
    }

    if config.speech.cloud.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Cloud max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.storage.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Cache directory cannot be empty".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    let cloud = &config.speech.cloud;
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Speech Engine: {}", config.speech.engine.as_str());
    tracing::info!("Speech Rate: {}", config.speech.speech_rate);
    if config.speech.http.url.is_empty() {
        tracing::info!("HTTP TTS: not configured");
    } else {
        tracing::info!("HTTP TTS URL: {}", config.speech.http.url);
    }
    if cloud.is_enabled() {
        tracing::info!(
            "Cloud TTS: {} (key: ***, gate: {}, retries: {})",
            cloud.endpoint.as_deref().unwrap_or(&cloud.region),
            cloud.max_concurrent,
            cloud.max_retries
        );
        if cloud.proxy.is_some() {
            tracing::info!("Cloud TTS Proxy: ***");
        }
    } else {
        tracing::info!("Cloud TTS: not configured");
    }
    tracing::info!("Thread Count: {}", config.download.thread_count);
    tracing::info!("Expansion: {:?}", config.download.expansion);
    tracing::info!("Cache Directory: {:?}", config.storage.cache_dir);
    tracing::info!("Books Directory: {:?}", config.storage.books_dir);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ExpansionStrategy, SpeechEngine};
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.download.thread_count, 4);
        assert_eq!(config.speech.engine, SpeechEngine::Cloud);
        assert!(!config.speech.cloud.is_enabled());
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_threads() {
        let mut config = AppConfig::default();
        config.download.thread_count = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_error_for_zero_gate() {
        let mut config = AppConfig::default();
        config.speech.cloud.max_concurrent = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[speech]
engine = "http"
speech_rate = 10

[speech.http]
url = "http://localhost:9000/tts?text={{{{speakText}}}}"

[download]
thread_count = 2
expansion = "streaming"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.speech.engine, SpeechEngine::Http);
        assert_eq!(config.speech.speech_rate, 10);
        assert_eq!(
            config.speech.http.url,
            "http://localhost:9000/tts?text={{speakText}}"
        );
        assert_eq!(config.download.thread_count, 2);
        assert_eq!(config.download.expansion, ExpansionStrategy::Streaming);
        assert_eq!(config.storage.cache_dir.to_str(), Some("data/speech"));
    }
}
