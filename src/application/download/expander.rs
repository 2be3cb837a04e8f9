//! Chapter Expander - 章节区间 → 段落任务
//!
//! 展开结果缓存在 ExpansionPlan 中：两遍式（先计数再生成任务）的两遍
//! 读取的是同一份正文与分段结果，不会因为正文中途变化导致总数不一致。

use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    BookRepositoryPort, ChapterContentPort, ContentProcessorPort, RepositoryError,
};
use crate::domain::{BookRecord, ChapterDescriptor, ChapterRange, ParagraphTask};

/// 已展开的章节（正文已分段）
#[derive(Debug, Clone)]
pub struct ExpandedChapter {
    pub descriptor: ChapterDescriptor,
    pub paragraphs: Vec<String>,
}

/// 章节列表查询结果
#[derive(Debug, Clone)]
pub struct ChapterListing {
    pub book: Option<BookRecord>,
    pub chapters: Vec<ChapterDescriptor>,
}

/// 展开计划
///
/// 记录已展开的章节，并按 (章节标题, 段落文本) 去重：
/// 重复的段落会解析出同一个缓存 key，只保留第一次出现的那个
#[derive(Debug, Default)]
pub struct ExpansionPlan {
    book_id: String,
    chapters: Vec<ExpandedChapter>,
    seen: HashSet<(String, String)>,
    total: usize,
}

impl ExpansionPlan {
    pub fn new(book_id: impl Into<String>) -> Self {
        Self {
            book_id: book_id.into(),
            ..Default::default()
        }
    }

    /// 加入一个章节，返回其中新出现的段落任务
    pub fn push(&mut self, chapter: ExpandedChapter) -> Vec<ParagraphTask> {
        let mut unique = Vec::with_capacity(chapter.paragraphs.len());
        for paragraph in chapter.paragraphs {
            if self
                .seen
                .insert((chapter.descriptor.title.clone(), paragraph.clone()))
            {
                unique.push(paragraph);
            }
        }

        let tasks: Vec<ParagraphTask> = unique
            .iter()
            .map(|text| {
                ParagraphTask::new(
                    self.book_id.clone(),
                    chapter.descriptor.index,
                    chapter.descriptor.title.clone(),
                    text.clone(),
                )
            })
            .collect();

        self.total += tasks.len();
        self.chapters.push(ExpandedChapter {
            descriptor: chapter.descriptor,
            paragraphs: unique,
        });
        tasks
    }

    /// 段落总数（去重后）
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn chapters(&self) -> &[ExpandedChapter] {
        &self.chapters
    }

    /// 第二遍：由缓存的分段结果生成全部任务
    pub fn tasks(&self) -> Vec<ParagraphTask> {
        self.chapters
            .iter()
            .flat_map(|chapter| {
                chapter.paragraphs.iter().map(move |text| {
                    ParagraphTask::new(
                        self.book_id.clone(),
                        chapter.descriptor.index,
                        chapter.descriptor.title.clone(),
                        text.clone(),
                    )
                })
            })
            .collect()
    }
}

/// 章节展开器
pub struct ChapterExpander {
    books: Arc<dyn BookRepositoryPort>,
    contents: Arc<dyn ChapterContentPort>,
    processor: Arc<dyn ContentProcessorPort>,
}

impl ChapterExpander {
    pub fn new(
        books: Arc<dyn BookRepositoryPort>,
        contents: Arc<dyn ChapterContentPort>,
        processor: Arc<dyn ContentProcessorPort>,
    ) -> Self {
        Self {
            books,
            contents,
            processor,
        }
    }

    /// 查询书籍与区间内的章节
    pub async fn list(
        &self,
        book_id: &str,
        range: ChapterRange,
    ) -> Result<ChapterListing, RepositoryError> {
        let chapters = self
            .books
            .get_chapter_list(book_id, range.start, range.end)
            .await?;
        if chapters.is_empty() {
            return Ok(ChapterListing {
                book: None,
                chapters,
            });
        }

        let book = self.books.get_book(book_id).await?;
        Ok(ChapterListing { book, chapters })
    }

    /// 展开单个章节
    ///
    /// 正文尚未下载的章节直接跳过（返回 None），不会加入队列
    pub async fn expand_chapter(
        &self,
        book: &BookRecord,
        chapter: &ChapterDescriptor,
    ) -> Option<ExpandedChapter> {
        if !self.contents.has_content(book, chapter).await {
            tracing::debug!(
                book_id = %book.book_id,
                chapter = %chapter.title,
                "Chapter text not downloaded, skipping"
            );
            return None;
        }

        let text = match self.contents.get_content(book, chapter).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::warn!(
                    book_id = %book.book_id,
                    chapter = %chapter.title,
                    "Chapter text vanished, skipping"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    book_id = %book.book_id,
                    chapter = %chapter.title,
                    error = %e,
                    "Failed to read chapter text, skipping"
                );
                return None;
            }
        };

        let paragraphs = self
            .processor
            .split_into_paragraphs(book, &chapter.title, &text);

        tracing::debug!(
            book_id = %book.book_id,
            chapter = %chapter.title,
            paragraphs = paragraphs.len(),
            "Chapter expanded"
        );

        Some(ExpandedChapter {
            descriptor: chapter.clone(),
            paragraphs,
        })
    }

    /// 第一遍：展开全部章节并缓存结果
    ///
    /// 取消后停止展开，返回已展开的部分
    pub async fn plan(
        &self,
        book: &BookRecord,
        chapters: &[ChapterDescriptor],
        cancel: &CancellationToken,
    ) -> ExpansionPlan {
        let mut plan = ExpansionPlan::new(book.book_id.clone());
        for chapter in chapters {
            if cancel.is_cancelled() {
                tracing::debug!(book_id = %book.book_id, "Expansion interrupted");
                break;
            }
            if let Some(expanded) = self.expand_chapter(book, chapter).await {
                plan.push(expanded);
            }
        }
        plan
    }

    /// 一次性展开：(章节, 段落任务, 总数)
    ///
    /// 书籍不存在时章节照常返回，任务为空
    pub async fn expand(
        &self,
        book_id: &str,
        range: ChapterRange,
        cancel: &CancellationToken,
    ) -> Result<(Vec<ChapterDescriptor>, Vec<ParagraphTask>, usize), RepositoryError> {
        let listing = self.list(book_id, range).await?;
        let Some(book) = listing.book else {
            return Ok((listing.chapters, Vec::new(), 0));
        };

        let plan = self.plan(&book, &listing.chapters, cancel).await;
        let tasks = plan.tasks();
        let total = plan.total();
        Ok((listing.chapters, tasks, total))
    }
}
