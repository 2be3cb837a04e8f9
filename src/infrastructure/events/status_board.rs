//! Status Board - 状态文本发布
//!
//! 实现 StatusSinkPort：保存每本书最新的状态文本与最近一条提示，
//! 并广播给订阅者（HTTP 状态查询、日志等）

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::application::ports::StatusSinkPort;

/// 状态事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum StatusEvent {
    /// 某本书的进度文本
    Progress { book_id: String, text: String },
    /// 与任务无关的提示
    Notice { text: String },
}

/// 状态面板
pub struct StatusBoard {
    /// book_id -> 最新状态文本
    latest: DashMap<String, String>,
    last_notice: RwLock<Option<String>>,
    channel: broadcast::Sender<StatusEvent>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            latest: DashMap::new(),
            last_notice: RwLock::new(None),
            channel: tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.channel.subscribe()
    }

    /// 某本书最新的状态文本
    pub fn latest(&self, book_id: &str) -> Option<String> {
        self.latest.get(book_id).map(|t| t.clone())
    }

    /// 全部书籍的最新状态文本（按 book_id 排序）
    pub fn all_latest(&self) -> BTreeMap<String, String> {
        self.latest
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn last_notice(&self) -> Option<String> {
        self.last_notice.read().ok().and_then(|n| n.clone())
    }

    fn broadcast(&self, event: StatusEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "No status subscribers");
        }
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSinkPort for StatusBoard {
    fn publish(&self, book_id: &str, text: &str) {
        let changed = self
            .latest
            .insert(book_id.to_string(), text.to_string())
            .map_or(true, |old| old != text);
        if changed {
            tracing::debug!(book_id = %book_id, status = %text, "Status updated");
            self.broadcast(StatusEvent::Progress {
                book_id: book_id.to_string(),
                text: text.to_string(),
            });
        }
    }

    fn notice(&self, text: &str) {
        tracing::info!(notice = %text, "Notice");
        if let Ok(mut last) = self.last_notice.write() {
            *last = Some(text.to_string());
        }
        self.broadcast(StatusEvent::Notice {
            text: text.to_string(),
        });
    }
}
