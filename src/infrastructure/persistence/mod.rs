//! Persistence Layer - 数据持久化
//!
//! SQLite 书籍/章节元数据存储

pub mod sqlite;

pub use self::sqlite::SqliteBookRepository;
