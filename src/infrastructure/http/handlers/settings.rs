//! Settings HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::application::{SettingsPort, SpeechSettings};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::memory::SettingsUpdate;

/// 当前语音设置
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SpeechSettings>> {
    Json(ApiResponse::success(state.settings.snapshot()))
}

/// 修改语音设置，下一次认领时生效
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<SpeechSettings>>, ApiError> {
    let Json(update) =
        payload.map_err(|e| ApiError::BadRequest(format!("Invalid settings: {}", e.body_text())))?;

    Ok(Json(ApiResponse::success(state.settings.update(update))))
}
