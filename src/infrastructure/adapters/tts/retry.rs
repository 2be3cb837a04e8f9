//! Retrying Synthesizer - 有界重试装饰器
//!
//! 包装任意后端：可重试的失败按指数退避重试，次数用尽后返回
//! `RetriesExhausted`；不可重试的失败直接返回。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{SpeechSynthesizerPort, SynthesisError};

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 首次调用之后最多再重试的次数
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// 第 n 次重试前的等待时间（n 从 1 开始）：base * 2^(n-1)，不超过 max_delay
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// 有界重试装饰器
pub struct RetryingSynthesizer {
    inner: Arc<dyn SpeechSynthesizerPort>,
    policy: RetryPolicy,
}

impl RetryingSynthesizer {
    pub fn new(inner: Arc<dyn SpeechSynthesizerPort>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl SpeechSynthesizerPort for RetryingSynthesizer {
    fn backend_id(&self) -> String {
        self.inner.backend_id()
    }

    async fn synthesize(&self, text: &str, speech_rate: i32) -> Result<Vec<u8>, SynthesisError> {
        let mut retry = 0;
        loop {
            let err = match self.inner.synthesize(text, speech_rate).await {
                Ok(audio) => return Ok(audio),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if retry >= self.policy.max_retries {
                return Err(SynthesisError::RetriesExhausted {
                    attempts: retry + 1,
                    last_error: err.to_string(),
                });
            }

            retry += 1;
            let delay = self.policy.delay_for(retry);
            tracing::debug!(
                retry = retry,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying synthesis"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 前 n 次调用返回给定错误
    struct Flaky {
        failures: u32,
        retryable: bool,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SpeechSynthesizerPort for Flaky {
        fn backend_id(&self) -> String {
            "flaky".into()
        }

        async fn synthesize(&self, _text: &str, _rate: i32) -> Result<Vec<u8>, SynthesisError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(SynthesisError::Canceled {
                    reason: "throttled".into(),
                    retryable: self.retryable,
                });
            }
            Ok(vec![7])
        }
    }

    fn flaky(failures: u32, retryable: bool) -> Arc<Flaky> {
        Arc::new(Flaky {
            failures,
            retryable,
            calls: AtomicU32::new(0),
        })
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
        }
    }

    #[test]
    fn test_delay_is_exponential_and_capped() {
        let policy = policy(5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(250));
        assert_eq!(policy.delay_for(40), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_within_budget() {
        let inner = flaky(2, true);
        let client = RetryingSynthesizer::new(inner.clone(), policy(3));

        assert_eq!(client.synthesize("x", 0).await.unwrap(), vec![7]);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_typed() {
        let inner = flaky(10, true);
        let client = RetryingSynthesizer::new(inner.clone(), policy(2));

        let err = client.synthesize("x", 0).await.unwrap_err();
        assert!(matches!(err, SynthesisError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let inner = flaky(1, false);
        let client = RetryingSynthesizer::new(inner.clone(), policy(3));

        let err = client.synthesize("x", 0).await.unwrap_err();
        assert!(matches!(err, SynthesisError::Canceled { retryable: false, .. }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.backend_id(), "flaky");
    }
}
