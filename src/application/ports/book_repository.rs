//! Book Ports - 书籍元数据与章节正文
//!
//! 外部协作者：元数据存储提供书籍与章节列表，正文缓存提供已下载的章节文本

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{BookRecord, ChapterDescriptor};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Book Repository Port
#[async_trait]
pub trait BookRepositoryPort: Send + Sync {
    /// 根据 ID 查找书籍
    async fn get_book(&self, book_id: &str) -> Result<Option<BookRecord>, RepositoryError>;

    /// 获取 [start, end) 区间内的章节，按章节序号排列
    async fn get_chapter_list(
        &self,
        book_id: &str,
        start: u32,
        end: u32,
    ) -> Result<Vec<ChapterDescriptor>, RepositoryError>;
}

/// Chapter Content Port
///
/// 只读取已经下载好的正文，不触发网络获取
#[async_trait]
pub trait ChapterContentPort: Send + Sync {
    /// 章节正文是否已下载
    async fn has_content(&self, book: &BookRecord, chapter: &ChapterDescriptor) -> bool;

    /// 读取章节正文
    async fn get_content(
        &self,
        book: &BookRecord,
        chapter: &ChapterDescriptor,
    ) -> Result<Option<String>, RepositoryError>;
}
