//! Fake TTS Client - 用于测试的合成后端
//!
//! 不调用任何服务：返回由文本生成的固定字节，可按文本注入失败、模拟延迟，
//! 并记录每次调用

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{SpeechSynthesizerPort, SynthesisError};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 参与缓存 key 计算的后端标识
    pub backend_id: String,
    /// 模拟合成延迟
    pub delay: Duration,
    /// 这些文本的合成会失败
    pub failing_texts: HashSet<String>,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            backend_id: "fake".to_string(),
            delay: Duration::from_millis(0),
            failing_texts: HashSet::new(),
        }
    }
}

impl FakeTtsClientConfig {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_on(mut self, text: impl Into<String>) -> Self {
        self.failing_texts.insert(text.into());
        self
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    calls: Mutex<Vec<String>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        Self {
            config,
            calls: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    /// 合成调用次数
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// 按调用顺序记录的文本
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// 同时进行中的最大调用数
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// 固定的"音频"内容
    pub fn audio_for(text: &str, speech_rate: i32) -> Vec<u8> {
        format!("FAKE:{}:{}", speech_rate, text).into_bytes()
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeTtsClient {
    fn backend_id(&self) -> String {
        self.config.backend_id.clone()
    }

    async fn synthesize(&self, text: &str, speech_rate: i32) -> Result<Vec<u8>, SynthesisError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        tracing::debug!(text_len = text.len(), "FakeTtsClient: synthesizing");
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        if self.config.failing_texts.contains(text) {
            return Err(SynthesisError::ServiceError {
                status: 500,
                message: format!("scripted failure for {:?}", text),
            });
        }
        Ok(Self::audio_for(text, speech_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_failures_and_call_log() {
        let client = FakeTtsClient::new(FakeTtsClientConfig::default().fail_on("bad"));

        assert_eq!(client.synthesize("ok", 5).await.unwrap(), b"FAKE:5:ok");
        assert!(client.synthesize("bad", 5).await.is_err());
        assert_eq!(client.calls(), vec!["ok", "bad"]);
        assert_eq!(client.call_count(), 2);
        assert_eq!(client.peak_concurrency(), 1);
    }
}
