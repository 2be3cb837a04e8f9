//! SQLite Book Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{BookRepositoryPort, RepositoryError};
use crate::domain::{BookRecord, ChapterDescriptor};

/// SQLite Book Repository
pub struct SqliteBookRepository {
    pool: DbPool,
}

impl SqliteBookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 保存书籍（已存在则更新）
    pub async fn save_book(&self, book: &BookRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO books (book_id, name, origin, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(book_id) DO UPDATE SET
                name = excluded.name,
                origin = excluded.origin,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&book.book_id)
        .bind(&book.name)
        .bind(&book.origin)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// 批量保存章节（已存在则更新）
    pub async fn save_chapters(&self, chapters: &[ChapterDescriptor]) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        for chapter in chapters {
            sqlx::query(
                r#"
                INSERT INTO chapters (book_id, chapter_index, url, title)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(book_id, chapter_index) DO UPDATE SET
                    url = excluded.url,
                    title = excluded.title
                "#,
            )
            .bind(&chapter.book_id)
            .bind(chapter.index as i64)
            .bind(&chapter.url)
            .bind(&chapter.title)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(count = chapters.len(), "Saved chapters");
        Ok(())
    }
}

#[derive(FromRow)]
struct BookRow {
    book_id: String,
    name: String,
    origin: String,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        BookRecord {
            book_id: row.book_id,
            name: row.name,
            origin: row.origin,
        }
    }
}

#[derive(FromRow)]
struct ChapterRow {
    book_id: String,
    chapter_index: i64,
    url: String,
    title: String,
}

impl TryFrom<ChapterRow> for ChapterDescriptor {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterDescriptor {
            index: u32::try_from(row.chapter_index).map_err(|e| {
                RepositoryError::DatabaseError(format!(
                    "Invalid chapter index {}: {}",
                    row.chapter_index, e
                ))
            })?,
            book_id: row.book_id,
            url: row.url,
            title: row.title,
        })
    }
}

#[async_trait]
impl BookRepositoryPort for SqliteBookRepository {
    async fn get_book(&self, book_id: &str) -> Result<Option<BookRecord>, RepositoryError> {
        let row: Option<BookRow> =
            sqlx::query_as("SELECT book_id, name, origin FROM books WHERE book_id = ?")
                .bind(book_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(row.map(BookRecord::from))
    }

    async fn get_chapter_list(
        &self,
        book_id: &str,
        start: u32,
        end: u32,
    ) -> Result<Vec<ChapterDescriptor>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(
            r#"
            SELECT book_id, chapter_index, url, title FROM chapters
            WHERE book_id = ? AND chapter_index >= ? AND chapter_index < ?
            ORDER BY chapter_index
            "#,
        )
        .bind(book_id)
        .bind(start as i64)
        .bind(end as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ChapterDescriptor::try_from).collect()
    }
}
