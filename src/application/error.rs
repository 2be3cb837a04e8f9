//! 应用层错误定义
//!
//! 只有 Start 的拒绝与启动期资源错误会越过控制器边界，
//! 单个任务的失败都在 worker 内部处理

use thiserror::Error;

use crate::application::ports::RepositoryError;

/// 宿主界面上展示的"已在下载"提示
pub const ALREADY_IN_DOWNLOAD: &str = "already in download";

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 同一本书已有运行中的任务
    #[error("already in download: {0}")]
    AlreadyRunning(String),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}
