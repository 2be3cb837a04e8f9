//! Synthesis Client - 按设置选择合成后端
//!
//! 引擎与语速在每次认领前读取一次，运行中切换引擎会在下一次认领时生效

use std::sync::Arc;

use crate::application::ports::{
    SettingsPort, SpeechEngine, SpeechSynthesizerPort, SynthesisError,
};

/// 本次认领使用的后端
#[derive(Clone)]
pub struct ResolvedBackend {
    pub engine: SpeechEngine,
    /// 参与缓存 key 计算
    pub backend_id: String,
    pub speech_rate: i32,
    synthesizer: Option<Arc<dyn SpeechSynthesizerPort>>,
}

impl ResolvedBackend {
    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        match &self.synthesizer {
            Some(synthesizer) => synthesizer.synthesize(text, self.speech_rate).await,
            None => Err(SynthesisError::BackendUnavailable(format!(
                "{} engine is not configured",
                self.engine.as_str()
            ))),
        }
    }
}

impl std::fmt::Debug for ResolvedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedBackend")
            .field("engine", &self.engine)
            .field("backend_id", &self.backend_id)
            .field("speech_rate", &self.speech_rate)
            .field("available", &self.is_available())
            .finish()
    }
}

/// 合成客户端
pub struct SynthesisClient {
    cloud: Option<Arc<dyn SpeechSynthesizerPort>>,
    http: Option<Arc<dyn SpeechSynthesizerPort>>,
    settings: Arc<dyn SettingsPort>,
}

impl SynthesisClient {
    pub fn new(
        cloud: Option<Arc<dyn SpeechSynthesizerPort>>,
        http: Option<Arc<dyn SpeechSynthesizerPort>>,
        settings: Arc<dyn SettingsPort>,
    ) -> Self {
        Self {
            cloud,
            http,
            settings,
        }
    }

    /// 读取当前设置并选择后端
    pub fn resolve(&self) -> ResolvedBackend {
        let settings = self.settings.snapshot();
        let synthesizer = match settings.engine {
            SpeechEngine::Cloud => self.cloud.clone(),
            SpeechEngine::Http => self.http.clone(),
        };
        let backend_id = synthesizer
            .as_ref()
            .map(|s| s.backend_id())
            .unwrap_or_else(|| settings.engine.as_str().to_string());

        ResolvedBackend {
            engine: settings.engine,
            backend_id,
            speech_rate: settings.speech_rate,
            synthesizer,
        }
    }
}
