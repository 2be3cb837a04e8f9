//! Progress Aggregator - 进度统计与定时上报
//!
//! 计数器全部是原子量，worker 每完成一个任务上报一次；
//! 上报线程按固定周期拉取快照（pull 模型），与 worker 的完成速度无关。

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::ports::StatusSinkPort;

/// 进度快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub finished: u64,
    pub succeeded: u64,
    pub total: u64,
    /// 总数是否已确定（展开结束）
    pub sealed: bool,
    pub last_title: String,
}

impl ProgressSnapshot {
    /// 宿主展示用的状态文本
    pub fn status_text(&self) -> String {
        format!(
            "progress:{}/{},success:{},{}",
            self.finished, self.total, self.succeeded, self.last_title
        )
    }
}

/// 进度聚合器
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    finished: AtomicU64,
    succeeded: AtomicU64,
    total: AtomicU64,
    sealed: AtomicBool,
    completed: AtomicBool,
    /// 仅用于展示，并发下不保证是"最后"完成的那一章
    last_title: RwLock<String>,
    done: Notify,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加总数（流式展开时随章节增长）
    pub fn add_total(&self, n: u64) {
        self.total.fetch_add(n, Ordering::SeqCst);
    }

    /// 总数不再增长
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::SeqCst);
    }

    /// 记录一个任务完成
    ///
    /// 返回 true 表示本次调用触发了任务整体完成
    pub fn record(&self, success: bool, title: &str) -> bool {
        if let Ok(mut last) = self.last_title.write() {
            last.clear();
            last.push_str(title);
        }
        // finished 先于 succeeded 递增，snapshot 反序读取
        self.finished.fetch_add(1, Ordering::SeqCst);
        if success {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        }
        self.try_complete()
    }

    /// 检测完成条件（已封口且 finished == total）
    ///
    /// 通过 CAS 保证只有一个调用方能触发完成
    pub fn try_complete(&self) -> bool {
        if !self.sealed.load(Ordering::SeqCst) {
            return false;
        }
        if self.finished.load(Ordering::SeqCst) < self.total.load(Ordering::SeqCst) {
            return false;
        }
        let won = self
            .completed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            self.done.notify_one();
        }
        won
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// 等待完成
    ///
    /// notify_one 会保留许可，完成发生在等待之前也不会丢失
    pub async fn wait_completed(&self) {
        if self.is_completed() {
            return;
        }
        self.done.notified().await;
    }

    /// 读取顺序与写入顺序相反，保证 succeeded <= finished <= total
    pub fn snapshot(&self) -> ProgressSnapshot {
        let succeeded = self.succeeded.load(Ordering::SeqCst);
        let finished = self.finished.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        ProgressSnapshot {
            finished,
            succeeded,
            total,
            sealed: self.sealed.load(Ordering::SeqCst),
            last_title: self
                .last_title
                .read()
                .map(|t| t.clone())
                .unwrap_or_default(),
        }
    }
}

/// 启动定时上报任务，取消后退出
pub fn spawn_reporter(
    book_id: String,
    progress: Arc<ProgressAggregator>,
    sink: Arc<dyn StatusSinkPort>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let text = progress.snapshot().status_text();
                    sink.publish(&book_id, &text);
                }
            }
        }
        tracing::debug!(book_id = %book_id, "Progress reporter stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        published: Mutex<Vec<(String, String)>>,
    }

    impl StatusSinkPort for RecordingSink {
        fn publish(&self, book_id: &str, text: &str) {
            self.published
                .lock()
                .unwrap()
                .push((book_id.to_string(), text.to_string()));
        }

        fn notice(&self, _text: &str) {}
    }

    #[test]
    fn test_status_text_format() {
        let progress = ProgressAggregator::new();
        progress.add_total(4);
        progress.record(true, "Chapter 1");
        progress.record(false, "Chapter 2");

        assert_eq!(
            progress.snapshot().status_text(),
            "progress:2/4,success:1,Chapter 2"
        );
    }

    #[test]
    fn test_completion_requires_seal() {
        let progress = ProgressAggregator::new();
        progress.add_total(1);
        assert!(!progress.record(true, "c"));
        assert!(!progress.is_completed());

        progress.seal();
        assert!(progress.try_complete());
        // 只能触发一次
        assert!(!progress.try_complete());
    }

    #[test]
    fn test_last_worker_completes() {
        let progress = ProgressAggregator::new();
        progress.add_total(2);
        progress.seal();
        assert!(!progress.record(true, "a"));
        assert!(progress.record(true, "b"));
        assert!(!progress.try_complete());
    }

    #[test]
    fn test_empty_job_completes_on_seal() {
        let progress = ProgressAggregator::new();
        progress.seal();
        assert!(progress.try_complete());
        assert_eq!(progress.snapshot().status_text(), "progress:0/0,success:0,");
    }

    #[test]
    fn test_concurrent_records_complete_exactly_once() {
        let progress = Arc::new(ProgressAggregator::new());
        progress.add_total(400);
        progress.seal();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let progress = progress.clone();
                std::thread::spawn(move || {
                    (0..50).filter(|_| progress.record(true, "t")).count()
                })
            })
            .collect();
        let winners: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(winners, 1);
        let snapshot = progress.snapshot();
        assert_eq!(snapshot.finished, 400);
        assert_eq!(snapshot.succeeded, 400);
    }

    #[test]
    fn test_snapshot_never_shows_more_successes_than_finished() {
        const THREADS: u64 = 4;
        const PER_THREAD: u64 = 20_000;
        let progress = Arc::new(ProgressAggregator::new());
        progress.add_total(THREADS * PER_THREAD);
        progress.seal();

        let writers: Vec<_> = (0..THREADS)
            .map(|_| {
                let progress = progress.clone();
                std::thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        progress.record(true, "");
                    }
                })
            })
            .collect();

        let mut samples = 0u64;
        while !progress.is_completed() {
            let s = progress.snapshot();
            assert!(s.succeeded <= s.finished, "succeeded {} > finished {}", s.succeeded, s.finished);
            assert!(s.finished <= s.total, "finished {} > total {}", s.finished, s.total);
            samples += 1;
        }
        for writer in writers {
            writer.join().unwrap();
        }

        assert!(samples > 0);
        let s = progress.snapshot();
        assert_eq!((s.finished, s.succeeded), (THREADS * PER_THREAD, THREADS * PER_THREAD));
    }

    #[tokio::test]
    async fn test_wait_completed_after_the_fact() {
        let progress = ProgressAggregator::new();
        progress.seal();
        progress.try_complete();
        tokio::time::timeout(Duration::from_secs(1), progress.wait_completed())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reporter_publishes_until_cancelled() {
        let progress = Arc::new(ProgressAggregator::new());
        progress.add_total(3);
        let sink = Arc::new(RecordingSink::default());
        let cancel = CancellationToken::new();

        let handle = spawn_reporter(
            "B1".to_string(),
            progress.clone(),
            sink.clone(),
            Duration::from_secs(1),
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_millis(2500)).await;
        cancel.cancel();
        handle.await.unwrap();

        let published = sink.published.lock().unwrap();
        // t=0, 1s, 2s
        assert_eq!(published.len(), 3);
        assert_eq!(published[0], ("B1".to_string(), "progress:0/3,success:0,".to_string()));
    }
}
