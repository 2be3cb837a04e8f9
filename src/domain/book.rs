//! Book Context - 书籍与章节值对象

use serde::{Deserialize, Serialize};

/// 书籍记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// 书籍唯一标识（宿主应用中为 bookUrl）
    pub book_id: String,
    pub name: String,
    /// 书源标识
    pub origin: String,
}

/// 章节描述
///
/// 由外部元数据存储产生，流水线只读使用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterDescriptor {
    pub book_id: String,
    pub index: u32,
    pub url: String,
    pub title: String,
}

/// 章节区间 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    pub start: u32,
    pub end: u32,
}

impl ChapterRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl std::fmt::Display for ChapterRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_display_is_half_open() {
        let range = ChapterRange::new(0, 2);
        assert!(!range.is_empty());
        assert_eq!(range.to_string(), "[0, 2)");
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(ChapterRange::new(5, 5).is_empty());
        assert!(ChapterRange::new(6, 2).is_empty());
    }
}
