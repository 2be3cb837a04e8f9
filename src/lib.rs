//! Aloud Precache - 有声朗读音频预缓存服务
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 书籍与章节描述、段落任务、缓存 key、正文分段
//!
//! 应用层 (application/):
//! - Ports: 端口定义（BookRepository, ChapterContent, ContentProcessor,
//!   SpeechSynthesizer, SpeechCache, Settings, StatusSink）
//! - Download: 展开、去重认领、worker 池、进度上报、任务控制器
//! - Commands: 宿主下发的 Start / Stop 命令
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Adapters: 云端 / HTTP TTS 客户端、语音缓存、章节正文、分段
//! - Persistence: SQLite 书籍与章节元数据
//! - Memory: 运行时语音设置
//! - Events: 状态文本发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
