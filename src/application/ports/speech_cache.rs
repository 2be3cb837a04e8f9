//! Speech Cache Port - 语音文件缓存
//!
//! 内容寻址的文件缓存：文件存在即代表合成成功，没有额外索引

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::CacheKey;

/// Speech Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

/// Speech Cache Port
#[async_trait]
pub trait SpeechCachePort: Send + Sync {
    /// 缓存 key 对应的绝对路径
    fn path_for(&self, key: &CacheKey) -> PathBuf;

    /// 是否已缓存（仅检查文件存在）
    async fn has(&self, key: &CacheKey) -> bool;

    /// 写入音频（先写临时文件再重命名）
    async fn put(&self, key: &CacheKey, audio: &[u8]) -> Result<PathBuf, CacheError>;
}
