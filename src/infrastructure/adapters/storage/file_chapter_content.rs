//! File Chapter Content - 已下载章节正文的文件存储
//!
//! 实现 ChapterContentPort trait
//!
//! 目录结构: `<root>/<md5_16(book_id)>/<index>-<md5_16(title)>.txt`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ChapterContentPort, RepositoryError};
use crate::domain::{md5_16, BookRecord, ChapterDescriptor};

/// 章节正文文件存储
pub struct FileChapterContent {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileChapterContent {
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    /// 书籍目录
    pub fn book_dir(&self, book_id: &str) -> PathBuf {
        self.base_dir.join(md5_16(book_id))
    }

    /// 章节正文文件路径
    pub fn chapter_path(&self, chapter: &ChapterDescriptor) -> PathBuf {
        self.book_dir(&chapter.book_id)
            .join(format!("{}-{}.txt", chapter.index, md5_16(&chapter.title)))
    }

    /// 保存章节正文（由正文下载流程调用）
    pub async fn save_content(
        &self,
        chapter: &ChapterDescriptor,
        text: &str,
    ) -> Result<PathBuf, RepositoryError> {
        let path = self.chapter_path(chapter);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::IoError(e.to_string()))?;
        }

        fs::write(&path, text)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        tracing::debug!(
            book_id = %chapter.book_id,
            chapter = %chapter.title,
            size = text.len(),
            "Saved chapter text"
        );
        Ok(path)
    }
}

#[async_trait]
impl ChapterContentPort for FileChapterContent {
    async fn has_content(&self, _book: &BookRecord, chapter: &ChapterDescriptor) -> bool {
        match fs::metadata(self.chapter_path(chapter)).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    async fn get_content(
        &self,
        _book: &BookRecord,
        chapter: &ChapterDescriptor,
    ) -> Result<Option<String>, RepositoryError> {
        match fs::read_to_string(self.chapter_path(chapter)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> BookRecord {
        BookRecord {
            book_id: "B1".into(),
            name: "Book".into(),
            origin: "local".into(),
        }
    }

    fn chapter(index: u32) -> ChapterDescriptor {
        ChapterDescriptor {
            book_id: "B1".into(),
            index,
            url: format!("/c/{}", index),
            title: format!("Chapter {}", index),
        }
    }

    #[tokio::test]
    async fn test_save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileChapterContent::new(dir.path()).await.unwrap();

        assert!(!store.has_content(&book(), &chapter(0)).await);
        assert_eq!(store.get_content(&book(), &chapter(0)).await.unwrap(), None);

        let path = store.save_content(&chapter(0), "正文").await.unwrap();
        assert!(path.starts_with(store.book_dir("B1")));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("0-"));

        assert!(store.has_content(&book(), &chapter(0)).await);
        assert_eq!(
            store.get_content(&book(), &chapter(0)).await.unwrap().as_deref(),
            Some("正文")
        );
        assert!(!store.has_content(&book(), &chapter(1)).await);
    }
}
