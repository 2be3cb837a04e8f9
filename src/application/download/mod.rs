//! Download - 预缓存流水线
//!
//! - expander: 章节区间 → 段落任务
//! - registry: 待认领任务与在途 key
//! - synthesis: 按设置选择合成后端
//! - worker: 固定宽度的 worker 池
//! - progress: 进度统计与定时上报
//! - controller: 任务生命周期（Start / Stop / 完成）

mod controller;
mod expander;
mod progress;
mod registry;
mod synthesis;
mod worker;

pub use controller::{
    DownloadController, DownloadControllerConfig, ExpansionStrategy, JobSnapshot, JobState,
    StartReceipt,
};
pub use expander::{ChapterExpander, ChapterListing, ExpandedChapter, ExpansionPlan};
pub use progress::{spawn_reporter, ProgressAggregator, ProgressSnapshot};
pub use registry::{Claim, DedupRegistry};
pub use synthesis::{ResolvedBackend, SynthesisClient};
pub use worker::{TaskOutcome, WorkerContext, WorkerPool};
