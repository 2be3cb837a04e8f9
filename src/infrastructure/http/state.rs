//! Application State
//!
//! 处理器共享的控制器、运行时设置与状态面板

use std::sync::Arc;

use crate::application::DownloadController;
use crate::infrastructure::events::StatusBoard;
use crate::infrastructure::memory::RuntimeSettings;

/// 应用状态
pub struct AppState {
    pub controller: DownloadController,
    pub settings: Arc<RuntimeSettings>,
    pub status: Arc<StatusBoard>,
}

impl AppState {
    pub fn new(
        controller: DownloadController,
        settings: Arc<RuntimeSettings>,
        status: Arc<StatusBoard>,
    ) -> Self {
        Self {
            controller,
            settings,
            status,
        }
    }
}
