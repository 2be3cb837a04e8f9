//! Content Adapter - 正文分段实现

mod line_content_processor;

pub use line_content_processor::LineContentProcessor;
