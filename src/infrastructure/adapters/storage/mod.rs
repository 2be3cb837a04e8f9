//! Storage Adapter - 文件系统存储
//!
//! - file_speech_cache: 语音缓存（临时文件 + 重命名）
//! - file_chapter_content: 已下载章节正文

mod file_chapter_content;
mod file_speech_cache;

pub use file_chapter_content::FileChapterContent;
pub use file_speech_cache::FileSpeechCache;
