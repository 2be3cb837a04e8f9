//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod book_repository;
mod content_processor;
mod settings;
mod speech_cache;
mod speech_synthesizer;
mod status_sink;

pub use book_repository::{BookRepositoryPort, ChapterContentPort, RepositoryError};
pub use content_processor::ContentProcessorPort;
pub use settings::{SettingsPort, SpeechSettings};
pub use speech_cache::{CacheError, SpeechCachePort};
pub use speech_synthesizer::{SpeechEngine, SpeechSynthesizerPort, SynthesisError};
pub use status_sink::StatusSinkPort;
