//! Paragraph Task - 最小合成单元

use super::cache_key::CacheKey;

/// 段落任务
///
/// 一个段落对应一次合成。缓存 key 依赖当前后端与语速，在认领时才解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphTask {
    pub book_id: String,
    pub chapter_index: u32,
    pub chapter_title: String,
    pub text: String,
}

impl ParagraphTask {
    pub fn new(
        book_id: impl Into<String>,
        chapter_index: u32,
        chapter_title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            chapter_index,
            chapter_title: chapter_title.into(),
            text: text.into(),
        }
    }

    /// 按给定后端与语速解析缓存 key
    pub fn resolve_key(&self, backend_id: &str, speech_rate: i32) -> CacheKey {
        CacheKey::derive(&self.chapter_title, backend_id, speech_rate, &self.text)
    }
}

/// 已认领的任务（附带解析好的缓存 key）
#[derive(Debug, Clone)]
pub struct ClaimedTask {
    pub task: ParagraphTask,
    pub key: CacheKey,
}
