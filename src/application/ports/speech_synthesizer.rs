//! Speech Synthesizer Port - 语音合成后端抽象
//!
//! 两个可互换的后端（云端流式引擎、HTTP TTS）实现同一契约:
//! synthesize(text, rate) -> 音频字节 | 失败

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: HTTP {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 后端取消了本次合成
    #[error("Synthesis canceled (retryable: {retryable}): {reason}")]
    Canceled { reason: String, retryable: bool },

    /// 有界重试用尽
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// 标记模板缺失或渲染失败（本次调用的致命配置错误）
    #[error("Template error: {0}")]
    Template(String),

    /// 所选后端未配置
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl SynthesisError {
    /// 是否值得由调用方重试
    pub fn is_retryable(&self) -> bool {
        match self {
            SynthesisError::Canceled { retryable, .. } => *retryable,
            SynthesisError::Timeout | SynthesisError::NetworkError(_) => true,
            SynthesisError::ServiceError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// 语音引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechEngine {
    /// 云端流式合成（SSML）
    #[default]
    Cloud,
    /// 用户配置的 HTTP TTS 接口
    Http,
}

impl SpeechEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechEngine::Cloud => "cloud",
            SpeechEngine::Http => "http",
        }
    }
}

/// Speech Synthesizer Port
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 后端标识，参与缓存 key 计算（HTTP 后端为 URL，云端为 endpoint + 音色）
    fn backend_id(&self) -> String;

    /// 合成一段文本
    async fn synthesize(&self, text: &str, speech_rate: i32) -> Result<Vec<u8>, SynthesisError>;
}
