//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（书籍仓储、正文缓存、合成后端、语音缓存、设置、状态出口）
//! - download: 预缓存流水线（展开、去重认领、worker 池、进度、控制器）
//! - commands: 宿主下发的 Start / Stop 命令
//! - error: 应用层错误定义

pub mod commands;
pub mod download;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{CommandOutcome, DownloadCommand};

pub use download::{
    ChapterExpander, DedupRegistry, DownloadController, DownloadControllerConfig,
    ExpansionStrategy, JobSnapshot, JobState, ProgressAggregator, ProgressSnapshot,
    StartReceipt, SynthesisClient,
};

pub use error::{ApplicationError, ALREADY_IN_DOWNLOAD};

pub use ports::{
    BookRepositoryPort, CacheError, ChapterContentPort, ContentProcessorPort, RepositoryError,
    SettingsPort, SpeechCachePort, SpeechEngine, SpeechSettings, SpeechSynthesizerPort,
    StatusSinkPort, SynthesisError,
};
