//! Runtime Settings - 可在运行中修改的语音设置
//!
//! 实现 SettingsPort；启动时由配置文件初始化，之后可通过 HTTP 接口修改。
//! 修改在下一次认领时生效，不影响已在合成中的段落。

use std::sync::RwLock;

use crate::application::ports::{SettingsPort, SpeechEngine, SpeechSettings};

/// 设置修改（未给出的字段保持不变）
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SettingsUpdate {
    pub engine: Option<SpeechEngine>,
    pub speech_rate: Option<i32>,
    pub thread_count: Option<usize>,
}

/// 内存设置
pub struct RuntimeSettings {
    current: RwLock<SpeechSettings>,
}

impl RuntimeSettings {
    pub fn new(initial: SpeechSettings) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// 应用修改并返回修改后的设置
    pub fn update(&self, update: SettingsUpdate) -> SpeechSettings {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        if let Some(engine) = update.engine {
            current.engine = engine;
        }
        if let Some(rate) = update.speech_rate {
            current.speech_rate = rate;
        }
        if let Some(threads) = update.thread_count {
            current.thread_count = threads.max(1);
        }
        tracing::info!(
            engine = current.engine.as_str(),
            speech_rate = current.speech_rate,
            thread_count = current.thread_count,
            "Speech settings updated"
        );
        current.clone()
    }
}

impl SettingsPort for RuntimeSettings {
    fn snapshot(&self) -> SpeechSettings {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
