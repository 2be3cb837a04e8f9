//! SQLite Persistence - 书籍与章节元数据

mod book_repo;
mod database;

pub use book_repo::*;
pub use database::*;
