//! Dedup Registry - 待认领任务与在途 key
//!
//! 每本书一个条目，保存尚未认领的章节/段落以及该任务存活的 worker 数。
//! 在途 key 是进程级的：缓存根目录被所有书共享，同一 key 任何时刻只属于一个任务。
//! 认领在书条目锁内完成，锁顺序固定为先书条目、后在途表。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::VecDeque;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use crate::application::error::ApplicationError;
use crate::domain::{CacheKey, ClaimedTask, ParagraphTask};

/// 尚有待认领段落的章节
#[derive(Debug)]
struct PendingChapter {
    index: u32,
    paragraphs: VecDeque<ParagraphTask>,
}

/// 单本书的登记条目
#[derive(Debug, Default)]
struct JobEntry {
    chapters: Vec<PendingChapter>,
    active_workers: usize,
}

impl JobEntry {
    fn pending_count(&self) -> usize {
        self.chapters.iter().map(|c| c.paragraphs.len()).sum()
    }
}

/// 认领结果
#[derive(Debug)]
pub enum Claim {
    Task(ClaimedTask),
    /// 剩余任务的 key 都被其他书占用，等释放后重试
    Blocked,
    /// 没有可认领的任务，worker 已注销
    Exhausted,
}

impl Claim {
    pub fn into_task(self) -> Option<ClaimedTask> {
        match self {
            Claim::Task(claimed) => Some(claimed),
            Claim::Blocked | Claim::Exhausted => None,
        }
    }
}

/// 去重登记表
#[derive(Debug, Default)]
pub struct DedupRegistry {
    /// book_id -> JobEntry
    jobs: DashMap<String, JobEntry>,
    /// 在途 key -> 持有者 book_id
    in_flight: DashMap<CacheKey, String>,
    released: Notify,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一本书；已有存活条目时拒绝
    pub fn register_job(&self, book_id: &str) -> Result<(), ApplicationError> {
        match self.jobs.entry(book_id.to_string()) {
            Entry::Occupied(_) => Err(ApplicationError::AlreadyRunning(book_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(JobEntry::default());
                tracing::debug!(book_id = %book_id, "Job registered");
                Ok(())
            }
        }
    }

    /// 补充待认领任务
    ///
    /// 返回需要新启动的 worker 数：把存活 worker 补足到 pool_width，
    /// 且不超过当前可认领的任务数。书未登记时丢弃任务并返回 0
    pub fn seed(&self, book_id: &str, tasks: Vec<ParagraphTask>, pool_width: usize) -> usize {
        let Some(mut entry) = self.jobs.get_mut(book_id) else {
            tracing::debug!(book_id = %book_id, "Seeding unregistered job, dropping tasks");
            return 0;
        };

        let count = tasks.len();
        for task in tasks {
            match entry
                .chapters
                .iter_mut()
                .find(|c| c.index == task.chapter_index)
            {
                Some(chapter) => chapter.paragraphs.push_back(task),
                None => entry.chapters.push(PendingChapter {
                    index: task.chapter_index,
                    paragraphs: VecDeque::from([task]),
                }),
            }
        }

        let claimable = entry.pending_count();
        let wanted = pool_width.min(entry.active_workers + claimable);
        let spawn = wanted.saturating_sub(entry.active_workers);
        entry.active_workers += spawn;

        tracing::debug!(
            book_id = %book_id,
            seeded = count,
            pending = claimable,
            spawn = spawn,
            "Tasks seeded"
        );
        spawn
    }

    /// 认领一个任务
    ///
    /// 返回第一个缓存 key 不在途的段落，并以本书名义占用该 key。
    /// 本书自己占用的重复段落由持有者释放后再认领，不算阻塞；
    /// 只剩被其他书占用的段落时返回 Blocked，worker 保持存活。
    /// 返回 Exhausted 时在锁内注销调用方 worker
    pub fn try_claim(&self, book_id: &str, backend_id: &str, speech_rate: i32) -> Claim {
        let Some(mut entry) = self.jobs.get_mut(book_id) else {
            return Claim::Exhausted;
        };
        let JobEntry {
            chapters,
            active_workers,
        } = &mut *entry;

        let mut claimed = None;
        let mut blocked = false;
        'chapters: for chapter in chapters.iter_mut() {
            for pos in 0..chapter.paragraphs.len() {
                let key = chapter.paragraphs[pos].resolve_key(backend_id, speech_rate);
                match self.in_flight.entry(key.clone()) {
                    Entry::Occupied(owner) => {
                        if owner.get() != book_id {
                            blocked = true;
                        }
                    }
                    Entry::Vacant(slot) => {
                        if let Some(task) = chapter.paragraphs.remove(pos) {
                            slot.insert(book_id.to_string());
                            claimed = Some(ClaimedTask { task, key });
                            break 'chapters;
                        }
                    }
                }
            }
        }
        chapters.retain(|c| !c.paragraphs.is_empty());

        match claimed {
            Some(claimed) => Claim::Task(claimed),
            None if blocked => Claim::Blocked,
            None => {
                *active_workers = active_workers.saturating_sub(1);
                Claim::Exhausted
            }
        }
    }

    /// 释放在途 key，只有持有者本书能释放
    pub fn release(&self, book_id: &str, key: &CacheKey) {
        if self.in_flight.remove_if(key, |_, owner| owner == book_id).is_some() {
            self.released.notify_waiters();
        }
    }

    /// 下一次释放的通知
    ///
    /// 在 try_claim 之前创建，避免错过认领与等待之间发生的释放
    pub fn released(&self) -> Notified<'_> {
        self.released.notified()
    }

    /// 清除一本书的全部登记，包括它仍持有的在途 key
    pub fn remove_job(&self, book_id: &str) -> bool {
        let removed = self.jobs.remove(book_id).is_some();
        let before = self.in_flight.len();
        self.in_flight.retain(|_, owner| owner != book_id);
        if self.in_flight.len() != before {
            self.released.notify_waiters();
        }
        if removed {
            tracing::debug!(book_id = %book_id, "Job unregistered");
        }
        removed
    }

    pub fn pending_count(&self, book_id: &str) -> usize {
        self.jobs
            .get(book_id)
            .map(|e| e.pending_count())
            .unwrap_or(0)
    }

    /// 本书持有的在途 key 数
    pub fn in_flight_count(&self, book_id: &str) -> usize {
        self.in_flight
            .iter()
            .filter(|owner| owner.value() == book_id)
            .count()
    }

    pub fn active_workers(&self, book_id: &str) -> usize {
        self.jobs.get(book_id).map(|e| e.active_workers).unwrap_or(0)
    }
}
