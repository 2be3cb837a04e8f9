//! TTS Adapter - 合成后端实现
//!
//! - cloud_tts_client: 云端流式合成（SSML 模板 + 准入闸门）
//! - http_tts_client: 用户配置的 HTTP TTS 接口
//! - retry: 有界重试装饰器
//! - fake_tts_client: 测试用后端

mod cloud_tts_client;
mod fake_tts_client;
mod http_tts_client;
mod retry;
mod ssml_template;

pub use cloud_tts_client::{CloudTtsClient, CloudTtsClientConfig, DEFAULT_MAX_CONCURRENT};
pub use fake_tts_client::{FakeTtsClient, FakeTtsClientConfig};
pub use http_tts_client::*;
pub use retry::{RetryPolicy, RetryingSynthesizer};
pub use ssml_template::{SsmlTemplate, TemplateError, DEFAULT_SSML_TEMPLATE};
