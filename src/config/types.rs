//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{ExpansionStrategy, SpeechEngine};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 语音合成配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 预缓存任务配置
    #[serde(default)]
    pub download: DownloadConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 语音合成配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechConfig {
    /// 启动时选用的引擎，运行中可通过接口修改
    #[serde(default)]
    pub engine: SpeechEngine,

    /// 语速（百分比偏移）
    #[serde(default)]
    pub speech_rate: i32,

    #[serde(default)]
    pub http: HttpSpeechConfig,

    #[serde(default)]
    pub cloud: CloudSpeechConfig,
}

/// 用户自定义 HTTP TTS 接口
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSpeechConfig {
    /// 接口 URL，可含 `{{speakText}}` / `{{speakSpeed}}` 占位符；为空表示未配置
    #[serde(default)]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for HttpSpeechConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 云端流式合成
#[derive(Debug, Clone, Deserialize)]
pub struct CloudSpeechConfig {
    /// 完整接口地址；未设置时由 region 生成
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_region")]
    pub region: String,

    /// 订阅密钥；为空时不启用云端引擎
    #[serde(default)]
    pub subscription_key: String,

    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// 准入闸门容量
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// SSML 模板文件；未设置时使用内置模板
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    #[serde(default)]
    pub proxy: Option<String>,

    /// 可重试取消的最大重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_region() -> String {
    "eastus".to_string()
}

fn default_output_format() -> String {
    "audio-24khz-48kbitrate-mono-mp3".to_string()
}

fn default_max_concurrent() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    8000
}

impl Default for CloudSpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            subscription_key: String::new(),
            output_format: default_output_format(),
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_timeout_secs(),
            template_path: None,
            proxy: None,
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl CloudSpeechConfig {
    /// 是否配置了云端引擎
    pub fn is_enabled(&self) -> bool {
        !self.subscription_key.is_empty()
    }
}

/// 预缓存任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// worker 池宽度（每个任务启动时读取）
    #[serde(default = "default_thread_count")]
    pub thread_count: usize,

    /// Stop 时等待 worker 退出的时间（毫秒）
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// 状态文本上报间隔（毫秒）
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    #[serde(default)]
    pub expansion: ExpansionStrategy,
}

fn default_thread_count() -> usize {
    4
}

fn default_grace_period_ms() -> u64 {
    1000
}

fn default_progress_interval_ms() -> u64 {
    1000
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            thread_count: default_thread_count(),
            grace_period_ms: default_grace_period_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            expansion: ExpansionStrategy::default(),
        }
    }
}

impl DownloadConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 语音缓存目录（所有书籍共用）
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// 已下载章节正文目录
    #[serde(default = "default_books_dir")]
    pub books_dir: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/speech")
}

fn default_books_dir() -> PathBuf {
    PathBuf::from("data/books")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            books_dir: default_books_dir(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/precache.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别，可被 RUST_LOG 覆盖
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
