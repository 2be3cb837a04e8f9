//! Line Content Processor - 按行分段
//!
//! 实现 ContentProcessorPort，分段规则见 `domain::split_paragraphs`

use crate::application::ports::ContentProcessorPort;
use crate::domain::{split_paragraphs, BookRecord, SegmentConfig};

pub struct LineContentProcessor {
    config: SegmentConfig,
}

impl LineContentProcessor {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }
}

impl Default for LineContentProcessor {
    fn default() -> Self {
        Self::new(SegmentConfig::default())
    }
}

impl ContentProcessorPort for LineContentProcessor {
    fn split_into_paragraphs(&self, book: &BookRecord, title: &str, text: &str) -> Vec<String> {
        let paragraphs = split_paragraphs(title, text, &self.config);
        tracing::trace!(
            book_id = %book.book_id,
            chapter = %title,
            paragraphs = paragraphs.len(),
            "Chapter split"
        );
        paragraphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_with_configured_limit() {
        let processor = LineContentProcessor::new(SegmentConfig {
            max_paragraph_chars: 4,
            strip_title_line: true,
        });
        let book = BookRecord {
            book_id: "B1".into(),
            name: "Book".into(),
            origin: "local".into(),
        };

        let paragraphs = processor.split_into_paragraphs(&book, "T", "T\n一二。三四。\n\n五。");
        assert_eq!(paragraphs, vec!["一二。", "三四。", "五。"]);
    }
}
