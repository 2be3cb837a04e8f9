//! Settings Port - 只读配置面
//!
//! 引擎选择、语速、线程数由外部配置存储提供；每个任务认领时读取一次

use serde::{Deserialize, Serialize};

use super::speech_synthesizer::SpeechEngine;

/// 语音相关设置快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSettings {
    pub engine: SpeechEngine,
    pub speech_rate: i32,
    pub thread_count: usize,
}

/// Settings Port
pub trait SettingsPort: Send + Sync {
    fn snapshot(&self) -> SpeechSettings;

    fn engine(&self) -> SpeechEngine {
        self.snapshot().engine
    }

    fn speech_rate(&self) -> i32 {
        self.snapshot().speech_rate
    }

    fn thread_count(&self) -> usize {
        self.snapshot().thread_count
    }
}
