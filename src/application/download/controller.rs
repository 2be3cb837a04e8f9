//! Download Controller - 任务生命周期
//!
//! `Idle → Running → {Completed, Stopped}`。每本书同时最多一个任务；
//! 自然完成与 Stop 走同一套收尾流程，由先从任务表中移除任务的一方执行。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::expander::{ChapterExpander, ExpansionPlan};
use super::progress::{spawn_reporter, ProgressAggregator, ProgressSnapshot};
use super::registry::DedupRegistry;
use super::synthesis::SynthesisClient;
use super::worker::{WorkerContext, WorkerPool};
use crate::application::commands::{CommandOutcome, DownloadCommand};
use crate::application::error::{ApplicationError, ALREADY_IN_DOWNLOAD};
use crate::application::ports::{RepositoryError, SettingsPort, SpeechCachePort, StatusSinkPort};
use crate::domain::ChapterRange;

/// 章节展开策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionStrategy {
    /// 先统计总数，再一次性投放全部任务
    #[default]
    TwoPass,
    /// 逐章展开并投放，总数随章节增长，区间结束后封口
    Streaming,
}

/// 控制器配置
#[derive(Debug, Clone)]
pub struct DownloadControllerConfig {
    /// Stop 后等待 worker 退出的宽限期
    pub grace_period: Duration,
    /// 进度上报周期
    pub progress_interval: Duration,
    pub strategy: ExpansionStrategy,
}

impl Default for DownloadControllerConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(1),
            progress_interval: Duration::from_secs(1),
            strategy: ExpansionStrategy::TwoPass,
        }
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed,
    Stopped,
}

/// 任务快照
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub job_id: Uuid,
    pub book_id: String,
    pub range: ChapterRange,
    pub state: JobState,
    pub width: usize,
    pub progress: ProgressSnapshot,
    pub status_text: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Start 受理回执
#[derive(Debug, Clone, Serialize)]
pub struct StartReceipt {
    pub job_id: Uuid,
    pub book_id: String,
    pub range: ChapterRange,
    pub width: usize,
}

/// 运行中的任务
struct ActiveJob {
    job_id: Uuid,
    book_id: String,
    range: ChapterRange,
    width: usize,
    started_at: DateTime<Utc>,
    cancel: CancellationToken,
    progress: Arc<ProgressAggregator>,
    pool: WorkerPool,
    runner: Mutex<Option<JoinHandle<()>>>,
    reporter: Mutex<Option<JoinHandle<()>>>,
}

impl ActiveJob {
    fn snapshot(&self, state: JobState, finished_at: Option<DateTime<Utc>>) -> JobSnapshot {
        let progress = self.progress.snapshot();
        JobSnapshot {
            job_id: self.job_id,
            book_id: self.book_id.clone(),
            range: self.range,
            state,
            width: self.width,
            status_text: progress.status_text(),
            progress,
            started_at: self.started_at,
            finished_at,
        }
    }

    fn take_handle(slot: &Mutex<Option<JoinHandle<()>>>) -> Option<JoinHandle<()>> {
        slot.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

struct ControllerInner {
    config: DownloadControllerConfig,
    expander: Arc<ChapterExpander>,
    registry: Arc<DedupRegistry>,
    synthesis: Arc<SynthesisClient>,
    cache: Arc<dyn SpeechCachePort>,
    settings: Arc<dyn SettingsPort>,
    status: Arc<dyn StatusSinkPort>,
    jobs: DashMap<String, Arc<ActiveJob>>,
    finished: DashMap<String, JobSnapshot>,
    events: broadcast::Sender<JobSnapshot>,
}

/// 下载控制器
#[derive(Clone)]
pub struct DownloadController {
    inner: Arc<ControllerInner>,
}

impl DownloadController {
    pub fn new(
        config: DownloadControllerConfig,
        expander: Arc<ChapterExpander>,
        registry: Arc<DedupRegistry>,
        synthesis: Arc<SynthesisClient>,
        cache: Arc<dyn SpeechCachePort>,
        settings: Arc<dyn SettingsPort>,
        status: Arc<dyn StatusSinkPort>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(ControllerInner {
                config,
                expander,
                registry,
                synthesis,
                cache,
                settings,
                status,
                jobs: DashMap::new(),
                finished: DashMap::new(),
                events,
            }),
        }
    }

    /// 执行宿主命令
    pub async fn handle(&self, command: DownloadCommand) -> Result<CommandOutcome, ApplicationError> {
        match command {
            DownloadCommand::Start {
                book_id,
                start,
                end,
            } => self
                .start(&book_id, ChapterRange::new(start, end))
                .map(CommandOutcome::Started),
            DownloadCommand::Stop { book_id: Some(book_id) } => {
                let count = usize::from(self.stop_book(&book_id).await);
                Ok(CommandOutcome::Stopped { count })
            }
            DownloadCommand::Stop { book_id: None } => {
                let count = self.stop().await;
                Ok(CommandOutcome::Stopped { count })
            }
        }
    }

    /// 启动一本书的预缓存
    ///
    /// 同一本书已有任务时拒绝，并推送"已在下载"提示
    pub fn start(&self, book_id: &str, range: ChapterRange) -> Result<StartReceipt, ApplicationError> {
        let book_id = book_id.trim();
        if book_id.is_empty() {
            return Err(ApplicationError::validation("bookId must not be empty"));
        }

        let inner = &self.inner;
        if let Err(e) = inner.registry.register_job(book_id) {
            tracing::info!(book_id = %book_id, "Book is already being cached, start rejected");
            inner.status.notice(ALREADY_IN_DOWNLOAD);
            return Err(e);
        }

        let width = inner.settings.thread_count().max(1);
        let cancel = CancellationToken::new();
        let progress = Arc::new(ProgressAggregator::new());
        let pool = WorkerPool::new(WorkerContext {
            book_id: book_id.to_string(),
            registry: inner.registry.clone(),
            synthesis: inner.synthesis.clone(),
            cache: inner.cache.clone(),
            progress: progress.clone(),
            cancel: cancel.clone(),
        });

        let job = Arc::new(ActiveJob {
            job_id: Uuid::new_v4(),
            book_id: book_id.to_string(),
            range,
            width,
            started_at: Utc::now(),
            cancel,
            progress,
            pool,
            runner: Mutex::new(None),
            reporter: Mutex::new(None),
        });
        inner.jobs.insert(book_id.to_string(), job.clone());
        inner.finished.remove(book_id);

        let reporter = spawn_reporter(
            job.book_id.clone(),
            job.progress.clone(),
            inner.status.clone(),
            inner.config.progress_interval,
            job.cancel.clone(),
        );
        *job.reporter.lock().unwrap_or_else(|e| e.into_inner()) = Some(reporter);

        let runner = tokio::spawn(run_job(inner.clone(), job.clone()));
        *job.runner.lock().unwrap_or_else(|e| e.into_inner()) = Some(runner);

        tracing::info!(
            book_id = %book_id,
            job_id = %job.job_id,
            range = %range,
            width = width,
            strategy = ?inner.config.strategy,
            "Download job started"
        );

        Ok(StartReceipt {
            job_id: job.job_id,
            book_id: job.book_id.clone(),
            range,
            width,
        })
    }

    /// 停止全部任务，返回停止的任务数；没有任务时什么也不做
    pub async fn stop(&self) -> usize {
        let book_ids: Vec<String> = self.inner.jobs.iter().map(|e| e.key().clone()).collect();
        let stops = book_ids.iter().map(|book_id| self.stop_book(book_id));
        futures_util::future::join_all(stops)
            .await
            .into_iter()
            .filter(|stopped| *stopped)
            .count()
    }

    /// 停止一本书的任务
    pub async fn stop_book(&self, book_id: &str) -> bool {
        let Some((_, job)) = self.inner.jobs.remove(book_id) else {
            return false;
        };
        tracing::info!(book_id = %book_id, job_id = %job.job_id, "Stopping download job");

        job.cancel.cancel();
        // 展开任务可能还在投放，先结束它再清理登记
        if let Some(runner) = ActiveJob::take_handle(&job.runner) {
            runner.abort();
            let _ = runner.await;
        }
        self.inner.teardown(&job, JobState::Stopped).await;
        true
    }

    pub fn is_running(&self, book_id: &str) -> bool {
        self.inner.jobs.contains_key(book_id)
    }

    /// 书籍的当前或最近一次任务
    pub fn job(&self, book_id: &str) -> Option<JobSnapshot> {
        if let Some(job) = self.inner.jobs.get(book_id) {
            return Some(job.snapshot(JobState::Running, None));
        }
        self.inner.finished.get(book_id).map(|s| s.clone())
    }

    pub fn active_jobs(&self) -> Vec<JobSnapshot> {
        self.inner
            .jobs
            .iter()
            .map(|job| job.snapshot(JobState::Running, None))
            .collect()
    }

    pub fn finished_jobs(&self) -> Vec<JobSnapshot> {
        self.inner.finished.iter().map(|s| s.clone()).collect()
    }

    /// 订阅任务结束事件
    pub fn subscribe(&self) -> broadcast::Receiver<JobSnapshot> {
        self.inner.events.subscribe()
    }
}

impl ControllerInner {
    /// 展开区间并投放任务
    async fn expand(&self, job: &ActiveJob) -> Result<(), RepositoryError> {
        if job.range.is_empty() {
            tracing::info!(book_id = %job.book_id, range = %job.range, "Chapter range is empty");
            job.progress.seal();
            return Ok(());
        }

        match self.config.strategy {
            ExpansionStrategy::TwoPass => self.expand_two_pass(job).await,
            ExpansionStrategy::Streaming => self.expand_streaming(job).await,
        }
    }

    async fn expand_two_pass(&self, job: &ActiveJob) -> Result<(), RepositoryError> {
        let (chapters, tasks, total) = self
            .expander
            .expand(&job.book_id, job.range, &job.cancel)
            .await?;
        if job.cancel.is_cancelled() {
            return Ok(());
        }

        job.progress.add_total(total as u64);
        job.progress.seal();
        if chapters.is_empty() {
            tracing::info!(book_id = %job.book_id, range = %job.range, "{} is empty", job.book_id);
            return Ok(());
        }
        tracing::info!(
            book_id = %job.book_id,
            chapters = chapters.len(),
            paragraphs = total,
            "Chapters expanded"
        );

        let spawn = self.registry.seed(&job.book_id, tasks, job.width);
        job.pool.spawn(spawn);
        Ok(())
    }

    async fn expand_streaming(&self, job: &ActiveJob) -> Result<(), RepositoryError> {
        let listing = self.expander.list(&job.book_id, job.range).await?;
        if listing.chapters.is_empty() {
            tracing::info!(book_id = %job.book_id, range = %job.range, "{} is empty", job.book_id);
            job.progress.seal();
            return Ok(());
        }
        let Some(book) = listing.book else {
            tracing::warn!(book_id = %job.book_id, "Book not found, nothing to cache");
            job.progress.seal();
            return Ok(());
        };

        let mut plan = ExpansionPlan::new(job.book_id.clone());
        for chapter in &listing.chapters {
            if job.cancel.is_cancelled() {
                return Ok(());
            }
            let Some(expanded) = self.expander.expand_chapter(&book, chapter).await else {
                continue;
            };
            let tasks = plan.push(expanded);
            if tasks.is_empty() {
                continue;
            }
            // 先累加总数再投放，finished 不会超过 total
            job.progress.add_total(tasks.len() as u64);
            let spawn = self.registry.seed(&job.book_id, tasks, job.width);
            job.pool.spawn(spawn);
        }

        job.progress.seal();
        tracing::info!(
            book_id = %job.book_id,
            chapters = plan.chapters().len(),
            paragraphs = plan.total(),
            "Chapters expanded"
        );
        Ok(())
    }

    /// 收尾：等待 worker、推送最终状态、清理登记
    ///
    /// 登记最后清除，同一本书的新任务只能在最终状态落定之后启动
    async fn teardown(&self, job: &ActiveJob, state: JobState) {
        let drained = job.pool.shutdown(self.config.grace_period).await;
        job.cancel.cancel();
        if let Some(reporter) = ActiveJob::take_handle(&job.reporter) {
            let _ = reporter.await;
        }

        let snapshot = job.snapshot(state, Some(Utc::now()));
        self.status.publish(&job.book_id, &snapshot.status_text);

        tracing::info!(
            book_id = %job.book_id,
            job_id = %job.job_id,
            state = ?state,
            finished = snapshot.progress.finished,
            succeeded = snapshot.progress.succeeded,
            total = snapshot.progress.total,
            drained = drained,
            "Download job finished"
        );

        self.finished.insert(job.book_id.clone(), snapshot.clone());
        self.registry.remove_job(&job.book_id);
        let _ = self.events.send(snapshot);
    }
}

/// 任务主流程：展开 → 等待完成 → 收尾
async fn run_job(inner: Arc<ControllerInner>, job: Arc<ActiveJob>) {
    let expanded = tokio::select! {
        biased;
        _ = job.cancel.cancelled() => return,
        result = inner.expand(&job) => result,
    };
    if let Err(e) = expanded {
        tracing::error!(book_id = %job.book_id, error = %e, "Failed to expand chapters");
        job.progress.seal();
    }

    // 没有任务或全部已完成时由封口步骤触发完成
    job.progress.try_complete();

    tokio::select! {
        biased;
        _ = job.cancel.cancelled() => return,
        _ = job.progress.wait_completed() => {}
    }

    let removed = inner
        .jobs
        .remove_if(&job.book_id, |_, current| current.job_id == job.job_id)
        .is_some();
    if removed {
        inner.teardown(&job, JobState::Completed).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        BookRepositoryPort, CacheError, ChapterContentPort, ContentProcessorPort, SpeechEngine,
        SpeechSettings, SpeechSynthesizerPort, SynthesisError,
    };
    use crate::domain::{BookRecord, CacheKey, ChapterDescriptor};
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct OneBook;

    #[async_trait]
    impl BookRepositoryPort for OneBook {
        async fn get_book(&self, book_id: &str) -> Result<Option<BookRecord>, RepositoryError> {
            Ok((book_id == "B1").then(|| BookRecord {
                book_id: "B1".into(),
                name: "Book".into(),
                origin: "local".into(),
            }))
        }

        async fn get_chapter_list(
            &self,
            book_id: &str,
            start: u32,
            end: u32,
        ) -> Result<Vec<ChapterDescriptor>, RepositoryError> {
            Ok((start..end.min(2))
                .map(|index| ChapterDescriptor {
                    book_id: book_id.into(),
                    index,
                    url: format!("u{}", index),
                    title: format!("C{}", index),
                })
                .collect())
        }
    }

    struct TwoParagraphs;

    #[async_trait]
    impl ChapterContentPort for TwoParagraphs {
        async fn has_content(&self, _book: &BookRecord, _chapter: &ChapterDescriptor) -> bool {
            true
        }

        async fn get_content(
            &self,
            _book: &BookRecord,
            chapter: &ChapterDescriptor,
        ) -> Result<Option<String>, RepositoryError> {
            Ok(Some(format!("{} p1\n{} p2", chapter.title, chapter.title)))
        }
    }

    struct Lines;

    impl ContentProcessorPort for Lines {
        fn split_into_paragraphs(&self, _book: &BookRecord, _title: &str, text: &str) -> Vec<String> {
            text.lines().map(str::to_string).collect()
        }
    }

    /// 合成永远不返回，用来测试停止
    struct Hang;

    #[async_trait]
    impl SpeechSynthesizerPort for Hang {
        fn backend_id(&self) -> String {
            "hang".into()
        }

        async fn synthesize(&self, _text: &str, _rate: i32) -> Result<Vec<u8>, SynthesisError> {
            std::future::pending().await
        }
    }

    struct Instant;

    #[async_trait]
    impl SpeechSynthesizerPort for Instant {
        fn backend_id(&self) -> String {
            "instant".into()
        }

        async fn synthesize(&self, text: &str, _rate: i32) -> Result<Vec<u8>, SynthesisError> {
            Ok(text.as_bytes().to_vec())
        }
    }

    struct NullCache;

    #[async_trait]
    impl SpeechCachePort for NullCache {
        fn path_for(&self, key: &CacheKey) -> PathBuf {
            PathBuf::from(key.file_name())
        }

        async fn has(&self, _key: &CacheKey) -> bool {
            false
        }

        async fn put(&self, key: &CacheKey, _audio: &[u8]) -> Result<PathBuf, CacheError> {
            Ok(self.path_for(key))
        }
    }

    struct Fixed;

    impl SettingsPort for Fixed {
        fn snapshot(&self) -> SpeechSettings {
            SpeechSettings {
                engine: SpeechEngine::Cloud,
                speech_rate: 5,
                thread_count: 2,
            }
        }
    }

    #[derive(Default)]
    struct Notices(Mutex<Vec<String>>);

    impl StatusSinkPort for Notices {
        fn publish(&self, _book_id: &str, _text: &str) {}

        fn notice(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    /// 停止收尾推送最终状态时立即尝试重启同一本书
    #[derive(Default)]
    struct RestartOnPublish {
        controller: std::sync::OnceLock<DownloadController>,
        armed: std::sync::atomic::AtomicBool,
        restarts: Mutex<Vec<bool>>,
    }

    impl StatusSinkPort for RestartOnPublish {
        fn publish(&self, book_id: &str, _text: &str) {
            if !self.armed.load(std::sync::atomic::Ordering::SeqCst) {
                return;
            }
            if let Some(controller) = self.controller.get() {
                let ok = controller.start(book_id, ChapterRange::new(0, 2)).is_ok();
                self.restarts.lock().unwrap().push(ok);
            }
        }

        fn notice(&self, _text: &str) {}
    }

    fn controller(
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        strategy: ExpansionStrategy,
        notices: Arc<Notices>,
    ) -> DownloadController {
        controller_with_sink(synthesizer, strategy, notices)
    }

    fn controller_with_sink(
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        strategy: ExpansionStrategy,
        sink: Arc<dyn StatusSinkPort>,
    ) -> DownloadController {
        let settings: Arc<dyn SettingsPort> = Arc::new(Fixed);
        DownloadController::new(
            DownloadControllerConfig {
                grace_period: Duration::from_millis(100),
                progress_interval: Duration::from_millis(50),
                strategy,
            },
            Arc::new(ChapterExpander::new(
                Arc::new(OneBook),
                Arc::new(TwoParagraphs),
                Arc::new(Lines),
            )),
            Arc::new(DedupRegistry::new()),
            Arc::new(SynthesisClient::new(Some(synthesizer), None, settings.clone())),
            Arc::new(NullCache),
            settings,
            sink,
        )
    }

    async fn wait_finished(rx: &mut broadcast::Receiver<JobSnapshot>) -> JobSnapshot {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_job_completes_with_both_strategies() {
        for strategy in [ExpansionStrategy::TwoPass, ExpansionStrategy::Streaming] {
            let controller = controller(Arc::new(Instant), strategy, Arc::default());
            let mut rx = controller.subscribe();

            controller.start("B1", ChapterRange::new(0, 2)).unwrap();
            let snapshot = wait_finished(&mut rx).await;

            assert_eq!(snapshot.state, JobState::Completed);
            assert_eq!(snapshot.progress.total, 4);
            assert_eq!(snapshot.progress.succeeded, 4);
            assert!(!controller.is_running("B1"));
            assert_eq!(controller.stop().await, 0);
        }
    }

    #[tokio::test]
    async fn test_empty_range_completes_immediately() {
        let controller = controller(Arc::new(Instant), ExpansionStrategy::TwoPass, Arc::default());
        let mut rx = controller.subscribe();

        controller.start("B1", ChapterRange::new(5, 9)).unwrap();
        let snapshot = wait_finished(&mut rx).await;
        assert_eq!(snapshot.state, JobState::Completed);
        assert_eq!(snapshot.status_text, "progress:0/0,success:0,");
    }

    #[tokio::test]
    async fn test_second_start_rejected_with_notice() {
        let notices = Arc::new(Notices::default());
        let controller = controller(Arc::new(Hang), ExpansionStrategy::TwoPass, notices.clone());

        controller.start("B1", ChapterRange::new(0, 2)).unwrap();
        let err = controller.start("B1", ChapterRange::new(0, 2)).unwrap_err();
        assert!(matches!(err, ApplicationError::AlreadyRunning(_)));
        assert_eq!(*notices.0.lock().unwrap(), vec![ALREADY_IN_DOWNLOAD.to_string()]);

        assert_eq!(controller.stop().await, 1);
    }

    #[tokio::test]
    async fn test_stop_then_restart() {
        let controller = controller(Arc::new(Hang), ExpansionStrategy::TwoPass, Arc::default());
        let mut rx = controller.subscribe();

        controller.start("B1", ChapterRange::new(0, 2)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(controller.stop_book("B1").await);

        let snapshot = wait_finished(&mut rx).await;
        assert_eq!(snapshot.state, JobState::Stopped);
        assert_eq!(snapshot.progress.finished, 0);
        assert_eq!(controller.job("B1").unwrap().state, JobState::Stopped);

        // 停止是幂等的
        assert!(!controller.stop_book("B1").await);
        assert!(controller.start("B1", ChapterRange::new(0, 2)).is_ok());
        assert_eq!(controller.job("B1").unwrap().state, JobState::Running);
        assert!(controller.finished_jobs().is_empty());
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_restart_waits_for_final_status() {
        let sink = Arc::new(RestartOnPublish::default());
        let controller = controller_with_sink(Arc::new(Hang), ExpansionStrategy::TwoPass, sink.clone());
        let _ = sink.controller.set(controller.clone());
        let mut rx = controller.subscribe();

        controller.start("B1", ChapterRange::new(0, 2)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        sink.armed.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(controller.stop_book("B1").await);

        let snapshot = wait_finished(&mut rx).await;
        assert_eq!(snapshot.state, JobState::Stopped);

        // 最终状态推送时书仍在登记中，重启被拒绝，旧快照不会盖过新任务
        let restarts = sink.restarts.lock().unwrap().clone();
        assert!(!restarts.is_empty());
        assert!(restarts.iter().all(|ok| !ok));
        assert!(!controller.is_running("B1"));
        assert_eq!(controller.job("B1").unwrap().state, JobState::Stopped);

        // 收尾完成后可以立即重启
        sink.armed.store(false, std::sync::atomic::Ordering::SeqCst);
        assert!(controller.start("B1", ChapterRange::new(0, 2)).is_ok());
        assert!(controller.finished_jobs().is_empty());
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_blank_book_id_rejected() {
        let controller = controller(Arc::new(Instant), ExpansionStrategy::TwoPass, Arc::default());
        assert!(matches!(
            controller.start("  ", ChapterRange::new(0, 1)),
            Err(ApplicationError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_handle_dispatches_commands() {
        let controller = controller(Arc::new(Hang), ExpansionStrategy::Streaming, Arc::default());

        let started = controller
            .handle(DownloadCommand::start("B1", 0, 2))
            .await
            .unwrap();
        assert!(matches!(started, CommandOutcome::Started(ref r) if r.width == 2));

        let stopped = controller.handle(DownloadCommand::stop_all()).await.unwrap();
        assert!(matches!(stopped, CommandOutcome::Stopped { count: 1 }));
    }
}
