//! Domain Layer - 领域层
//!
//! 预缓存流水线的纯领域模型:
//! - book: 书籍与章节描述（只读，来自外部元数据存储）
//! - paragraph: 段落任务
//! - cache_key: 确定性的语音缓存 key
//! - text_segmenter: 章节正文 → 段落

mod book;
mod cache_key;
mod paragraph;
mod text_segmenter;

pub use book::{BookRecord, ChapterDescriptor, ChapterRange};
pub use cache_key::{md5_16, CacheKey};
pub use paragraph::{ClaimedTask, ParagraphTask};
pub use text_segmenter::{split_paragraphs, SegmentConfig};
