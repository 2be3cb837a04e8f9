//! Content Processor Port - 正文分段抽象

use crate::domain::BookRecord;

/// Content Processor Port
///
/// 将章节原始正文整理并切分为朗读段落
pub trait ContentProcessorPort: Send + Sync {
    fn split_into_paragraphs(&self, book: &BookRecord, title: &str, text: &str) -> Vec<String>;
}
