//! 集成测试共用的装配代码
//!
//! 真实的 SQLite（内存）、章节正文目录与语音缓存目录，合成后端为 FakeTtsClient

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use aloud_precache::application::{
    ChapterExpander, DedupRegistry, DownloadController, DownloadControllerConfig,
    ExpansionStrategy, JobSnapshot, SpeechEngine, SpeechSettings, SpeechSynthesizerPort,
    SynthesisClient,
};
use aloud_precache::domain::{BookRecord, ChapterDescriptor};
use aloud_precache::infrastructure::adapters::{
    FakeTtsClient, FileChapterContent, FileSpeechCache, LineContentProcessor,
};
use aloud_precache::infrastructure::events::StatusBoard;
use aloud_precache::infrastructure::memory::RuntimeSettings;
use aloud_precache::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteBookRepository,
};
use tempfile::TempDir;

pub const BOOK_ID: &str = "B1";

pub struct Harness {
    pub controller: DownloadController,
    pub fake: Arc<FakeTtsClient>,
    pub settings: Arc<RuntimeSettings>,
    pub status: Arc<StatusBoard>,
    pub cache_dir: TempDir,
    _books_dir: TempDir,
}

/// 默认书籍：两章，每章两段
pub fn default_chapters() -> Vec<(&'static str, &'static str)> {
    vec![
        ("第1章", "第1章\n第一章第一段。\n\n第一章第二段。"),
        ("第2章", "第2章\n第二章第一段。\n第二章第二段。"),
    ]
}

pub async fn harness(fake: FakeTtsClient) -> Harness {
    harness_with(fake, default_chapters(), ExpansionStrategy::TwoPass, 2).await
}

pub async fn harness_with(
    fake: FakeTtsClient,
    chapters: Vec<(&str, &str)>,
    strategy: ExpansionStrategy,
    thread_count: usize,
) -> Harness {
    harness_books(fake, vec![(BOOK_ID, chapters)], strategy, thread_count).await
}

/// 多本书共用一个控制器和缓存目录
pub async fn harness_books(
    fake: FakeTtsClient,
    library: Vec<(&str, Vec<(&str, &str)>)>,
    strategy: ExpansionStrategy,
    thread_count: usize,
) -> Harness {
    let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let books = SqliteBookRepository::new(pool);
    let books_dir = tempfile::tempdir().unwrap();
    let contents = FileChapterContent::new(books_dir.path()).await.unwrap();

    for (book_id, chapters) in library {
        books
            .save_book(&BookRecord {
                book_id: book_id.into(),
                name: format!("测试书 {}", book_id),
                origin: "local".into(),
            })
            .await
            .unwrap();

        let mut descriptors = Vec::new();
        for (index, (title, text)) in chapters.into_iter().enumerate() {
            let chapter = ChapterDescriptor {
                book_id: book_id.into(),
                index: index as u32,
                url: format!("/{}/chapter/{}", book_id, index),
                title: title.into(),
            };
            contents.save_content(&chapter, text).await.unwrap();
            descriptors.push(chapter);
        }
        books.save_chapters(&descriptors).await.unwrap();
    }

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(FileSpeechCache::new(cache_dir.path()).await.unwrap());

    let settings = Arc::new(RuntimeSettings::new(SpeechSettings {
        engine: SpeechEngine::Cloud,
        speech_rate: 0,
        thread_count,
    }));
    let status = StatusBoard::new().arc();
    let fake = Arc::new(fake);
    let synthesis = Arc::new(SynthesisClient::new(
        Some(fake.clone() as Arc<dyn SpeechSynthesizerPort>),
        None,
        settings.clone(),
    ));

    let controller = DownloadController::new(
        DownloadControllerConfig {
            grace_period: Duration::from_secs(1),
            progress_interval: Duration::from_millis(50),
            strategy,
        },
        Arc::new(ChapterExpander::new(
            Arc::new(books),
            Arc::new(contents),
            Arc::new(LineContentProcessor::default()),
        )),
        Arc::new(DedupRegistry::new()),
        synthesis,
        cache,
        settings.clone(),
        status.clone(),
    );

    Harness {
        controller,
        fake,
        settings,
        status,
        cache_dir,
        _books_dir: books_dir,
    }
}

/// 等待下一个任务结束事件
pub async fn next_finished(
    rx: &mut tokio::sync::broadcast::Receiver<JobSnapshot>,
) -> JobSnapshot {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("job did not finish in time")
        .expect("controller dropped")
}

/// 缓存目录中的音频文件数
pub fn audio_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "audio"))
        .count()
}

/// 缓存目录中的全部条目数（含临时文件）
pub fn all_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
