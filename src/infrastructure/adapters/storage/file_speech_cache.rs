//! File Speech Cache - 文件系统语音缓存
//!
//! 实现 SpeechCachePort trait
//!
//! 所有书共用一个缓存根目录，文件名为 `<key>.audio`。
//! 写入先落到同目录下的临时文件（`.<key>.<uuid>.tmp`）再重命名，
//! 因此"文件存在"总是意味着内容完整。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{CacheError, SpeechCachePort};
use crate::domain::CacheKey;

const TEMP_SUFFIX: &str = ".tmp";

/// 文件系统语音缓存
pub struct FileSpeechCache {
    /// 缓存根目录
    base_dir: PathBuf,
}

impl FileSpeechCache {
    /// 创建缓存并确保根目录存在
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    /// 获取缓存根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn temp_path_for(&self, key: &CacheKey) -> PathBuf {
        self.base_dir
            .join(format!(".{}.{}{}", key.as_str(), Uuid::new_v4(), TEMP_SUFFIX))
    }

    /// 清理上次异常退出留下的临时文件
    pub async fn remove_stale_temp_files(&self) -> Result<u64, CacheError> {
        let mut removed = 0u64;
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) {
                if fs::remove_file(entry.path()).await.is_ok() {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed = removed, dir = %self.base_dir.display(), "Removed stale temp files");
        }
        Ok(removed)
    }
}

/// key 只能包含十六进制字符和下划线，不能跳出缓存目录
fn validate_key(key: &CacheKey) -> Result<(), CacheError> {
    let valid = !key.as_str().is_empty()
        && key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl SpeechCachePort for FileSpeechCache {
    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.base_dir.join(key.file_name())
    }

    async fn has(&self, key: &CacheKey) -> bool {
        match fs::metadata(self.path_for(key)).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    async fn put(&self, key: &CacheKey, audio: &[u8]) -> Result<PathBuf, CacheError> {
        validate_key(key)?;

        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        let temp_path = self.temp_path_for(key);
        let final_path = self.path_for(key);

        if let Err(e) = fs::write(&temp_path, audio).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::IoError(format!(
                "Failed to write {}: {}",
                temp_path.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::IoError(format!(
                "Failed to rename into {}: {}",
                final_path.display(),
                e
            )));
        }

        tracing::debug!(key = %key, size = audio.len(), "Saved audio");
        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> CacheKey {
        CacheKey::derive("Chapter 1", "cloud", 5, text)
    }

    #[tokio::test]
    async fn test_put_then_has() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSpeechCache::new(dir.path().join("audio")).await.unwrap();
        let key = key("hello");

        assert!(!cache.has(&key).await);
        let path = cache.put(&key, b"audio-bytes").await.unwrap();

        assert!(cache.has(&key).await);
        assert_eq!(path, cache.path_for(&key));
        assert!(path.to_string_lossy().ends_with(".audio"));
        assert_eq!(std::fs::read(&path).unwrap(), b"audio-bytes");
    }

    #[tokio::test]
    async fn test_put_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSpeechCache::new(dir.path()).await.unwrap();
        cache.put(&key("a"), b"1").await.unwrap();
        cache.put(&key("b"), b"2").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".audio")));
    }

    #[tokio::test]
    async fn test_temp_file_is_not_a_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSpeechCache::new(dir.path()).await.unwrap();
        let key = key("partial");

        std::fs::write(cache.temp_path_for(&key), b"half").unwrap();
        assert!(!cache.has(&key).await);

        assert_eq!(cache.remove_stale_temp_files().await.unwrap(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileSpeechCache::new(dir.path()).await.unwrap();
        let key = key("same");

        cache.put(&key, b"first").await.unwrap();
        cache.put(&key, b"second").await.unwrap();
        assert_eq!(std::fs::read(cache.path_for(&key)).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");
        let cache = FileSpeechCache::new(&root).await.unwrap();

        // 根目录被普通文件占据时无法写入
        std::fs::remove_dir(&root).unwrap();
        std::fs::write(&root, b"not a dir").unwrap();

        let err = cache.put(&key("x"), b"1").await.unwrap_err();
        assert!(matches!(err, CacheError::IoError(_)));
        assert!(!cache.has(&key("x")).await);
    }
}
