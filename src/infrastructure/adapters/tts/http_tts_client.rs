//! HTTP TTS Client - 调用用户配置的 TTS HTTP 接口
//!
//! 实现 SpeechSynthesizerPort trait
//!
//! URL 模板沿用宿主的占位符约定:
//! GET  http://host/tts?text={{speakText}}&rate={{speakSpeed}}   (占位符替换，百分号编码)
//! POST http://host/tts  Request: {"text": "...", "rate": 5}     (URL 中没有占位符时)
//! Response: 音频二进制

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SpeechSynthesizerPort, SynthesisError};

/// 文本占位符
const SPEAK_TEXT: &str = "{{speakText}}";
/// 语速占位符
const SPEAK_SPEED: &str = "{{speakSpeed}}";

/// TTS 请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    /// 要合成的文本
    text: &'a str,
    /// 语速
    rate: i32,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 接口 URL（可含占位符）
    pub url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 60,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// URL 是否使用占位符（GET 模式）
    pub fn is_template(&self) -> bool {
        self.url.contains(SPEAK_TEXT) || self.url.contains(SPEAK_SPEED)
    }
}

/// HTTP TTS 客户端
///
/// 不做重试，失败直接返回给调用方
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, SynthesisError> {
        if config.url.trim().is_empty() {
            return Err(SynthesisError::BackendUnavailable(
                "HTTP TTS url is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 替换 URL 模板中的占位符
    fn render_url(&self, text: &str, speech_rate: i32) -> String {
        self.config
            .url
            .replace(SPEAK_TEXT, &urlencoding::encode(text))
            .replace(SPEAK_SPEED, &speech_rate.to_string())
    }

    fn build_request(&self, text: &str, speech_rate: i32) -> RequestBuilder {
        if self.config.is_template() {
            self.client.get(self.render_url(text, speech_rate))
        } else {
            self.client.post(&self.config.url).json(&TtsHttpRequest {
                text,
                rate: speech_rate,
            })
        }
    }
}

/// 文本或 JSON 响应通常是接口返回的错误信息
fn is_non_audio(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/json" || mime.ends_with("+json")
}

#[async_trait]
impl SpeechSynthesizerPort for HttpTtsClient {
    fn backend_id(&self) -> String {
        self.config.url.clone()
    }

    async fn synthesize(&self, text: &str, speech_rate: i32) -> Result<Vec<u8>, SynthesisError> {
        tracing::debug!(
            url = %self.config.url,
            text_len = text.len(),
            speech_rate = speech_rate,
            "Sending HTTP TTS request"
        );

        let response = self
            .build_request(text, speech_rate)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else if e.is_connect() {
                    SynthesisError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    SynthesisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ServiceError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if is_non_audio(&content_type) {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::InvalidResponse(format!(
                "Expected audio, got {}: {}",
                content_type,
                body.chars().take(200).collect::<String>()
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else {
                    SynthesisError::InvalidResponse(format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        if audio_data.is_empty() {
            return Err(SynthesisError::InvalidResponse("Empty audio body".to_string()));
        }

        tracing::debug!(
            audio_size = audio_data.len(),
            content_type = %content_type,
            "HTTP TTS request completed"
        );

        Ok(audio_data)
    }
}
