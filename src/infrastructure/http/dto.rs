//! Data Transfer Objects

use serde::Serialize;
use std::collections::BTreeMap;

use crate::application::JobSnapshot;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Download DTOs
// ============================================================================

/// 下载状态
#[derive(Debug, Serialize)]
pub struct DownloadStatusResponse {
    /// 运行中的任务
    pub active: Vec<JobSnapshot>,
    /// 每本书最近一次结束的任务
    pub finished: Vec<JobSnapshot>,
    /// book_id -> 最新状态文本
    pub status: BTreeMap<String, String>,
    pub last_notice: Option<String>,
}
