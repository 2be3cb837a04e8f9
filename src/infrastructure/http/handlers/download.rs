//! Download HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::application::{CommandOutcome, DownloadCommand};
use crate::infrastructure::http::dto::{ApiResponse, DownloadStatusResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 执行 Start / Stop 命令
///
/// 同一本书已在下载时返回 errno 409，error 为 "already in download"
pub async fn download_command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadCommand>, JsonRejection>,
) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    let Json(command) =
        payload.map_err(|e| ApiError::BadRequest(format!("Invalid command: {}", e.body_text())))?;

    tracing::info!(command = ?command, "Download command received");
    let outcome = state.controller.handle(command).await?;

    Ok(Json(ApiResponse::success(outcome)))
}

/// 查询下载状态
pub async fn download_status(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<DownloadStatusResponse>> {
    Json(ApiResponse::success(DownloadStatusResponse {
        active: state.controller.active_jobs(),
        finished: state.controller.finished_jobs(),
        status: state.status.all_latest(),
        last_notice: state.status.last_notice(),
    }))
}
