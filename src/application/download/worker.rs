//! Worker Pool - 固定宽度的合成 worker
//!
//! 每个 worker 循环：认领 → 命中缓存则直接成功 → 否则合成并写入缓存
//! → 释放 key → 上报一次进度 → 再次认领。认领为空时 worker 退出，
//! 剩余段落被其他书占用时等待释放通知。

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::progress::ProgressAggregator;
use super::registry::{Claim, DedupRegistry};
use super::synthesis::{ResolvedBackend, SynthesisClient};
use crate::application::ports::SpeechCachePort;
use crate::domain::ClaimedTask;

/// 单个任务的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// 缓存已存在，跳过合成
    Cached,
    /// 合成并写入成功
    Written,
    /// 合成或写入失败
    Failed,
    /// 停止后才返回的结果，丢弃且不计入进度
    Discarded,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Cached | TaskOutcome::Written)
    }
}

/// worker 共享的依赖
#[derive(Clone)]
pub struct WorkerContext {
    pub book_id: String,
    pub registry: Arc<DedupRegistry>,
    pub synthesis: Arc<SynthesisClient>,
    pub cache: Arc<dyn SpeechCachePort>,
    pub progress: Arc<ProgressAggregator>,
    pub cancel: CancellationToken,
}

/// Worker 池
pub struct WorkerPool {
    context: WorkerContext,
    workers: Mutex<JoinSet<()>>,
    closed: AtomicBool,
    next_id: AtomicUsize,
}

impl WorkerPool {
    pub fn new(context: WorkerContext) -> Self {
        Self {
            context,
            workers: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
            next_id: AtomicUsize::new(0),
        }
    }

    /// 启动 n 个 worker；池关闭后忽略
    pub fn spawn(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!(book_id = %self.context.book_id, "Pool closed, not spawning workers");
            return;
        }
        for _ in 0..n {
            let worker_id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let context = self.context.clone();
            workers.spawn(run_worker(worker_id, context));
        }
        tracing::debug!(
            book_id = %self.context.book_id,
            spawned = n,
            live = workers.len(),
            "Workers spawned"
        );
    }

    /// 关闭池并在宽限期内等待 worker 退出
    ///
    /// 超时后中止剩余 worker，返回 false
    pub async fn shutdown(&self, grace: Duration) -> bool {
        let mut workers = {
            let mut guard = self.workers.lock().unwrap_or_else(|e| e.into_inner());
            self.closed.store(true, Ordering::SeqCst);
            std::mem::take(&mut *guard)
        };

        let drained = tokio::time::timeout(grace, async {
            while let Some(result) = workers.join_next().await {
                if let Err(e) = result {
                    if e.is_panic() {
                        tracing::error!(book_id = %self.context.book_id, error = %e, "Worker panicked");
                    }
                }
            }
        })
        .await
        .is_ok();

        if !drained {
            tracing::warn!(
                book_id = %self.context.book_id,
                remaining = workers.len(),
                "Workers did not finish within grace period, aborting"
            );
            workers.abort_all();
            while workers.join_next().await.is_some() {}
        }
        drained
    }
}

/// worker 主循环
async fn run_worker(worker_id: usize, ctx: WorkerContext) {
    tracing::trace!(book_id = %ctx.book_id, worker_id, "Worker started");

    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }

        let backend = ctx.synthesis.resolve();
        let released = ctx.registry.released();
        let claimed = match ctx
            .registry
            .try_claim(&ctx.book_id, &backend.backend_id, backend.speech_rate)
        {
            Claim::Task(claimed) => claimed,
            Claim::Exhausted => break,
            Claim::Blocked => {
                // 其他书正在合成同一 key，释放后重新认领（多半命中缓存）
                tracing::trace!(book_id = %ctx.book_id, worker_id, "Waiting for key held by another job");
                tokio::select! {
                    _ = ctx.cancel.cancelled() => break,
                    _ = released => continue,
                }
            }
        };

        let outcome = process(&ctx, &backend, &claimed).await;
        ctx.registry.release(&ctx.book_id, &claimed.key);

        if outcome == TaskOutcome::Discarded {
            break;
        }
        ctx.progress
            .record(outcome.is_success(), &claimed.task.chapter_title);
    }

    tracing::trace!(book_id = %ctx.book_id, worker_id, "Worker exited");
}

/// 处理单个已认领的任务
async fn process(ctx: &WorkerContext, backend: &ResolvedBackend, claimed: &ClaimedTask) -> TaskOutcome {
    let key = &claimed.key;

    if ctx.cache.has(key).await {
        tracing::debug!(book_id = %ctx.book_id, key = %key, "Cache hit");
        return TaskOutcome::Cached;
    }

    let result = tokio::select! {
        _ = ctx.cancel.cancelled() => return TaskOutcome::Discarded,
        result = backend.synthesize(&claimed.task.text) => result,
    };

    // 合成返回后重新检查，停止后不再写入
    if ctx.cancel.is_cancelled() {
        tracing::debug!(book_id = %ctx.book_id, key = %key, "Job stopped, discarding result");
        return TaskOutcome::Discarded;
    }

    match result {
        Ok(audio) => match ctx.cache.put(key, &audio).await {
            Ok(path) => {
                tracing::debug!(
                    book_id = %ctx.book_id,
                    key = %key,
                    bytes = audio.len(),
                    path = %path.display(),
                    "Audio cached"
                );
                TaskOutcome::Written
            }
            Err(e) => {
                tracing::error!(book_id = %ctx.book_id, key = %key, error = %e, "Failed to write audio");
                TaskOutcome::Failed
            }
        },
        Err(e) => {
            tracing::warn!(
                book_id = %ctx.book_id,
                key = %key,
                engine = backend.engine.as_str(),
                chapter = %claimed.task.chapter_title,
                error = %e,
                "Synthesis failed"
            );
            TaskOutcome::Failed
        }
    }
}
