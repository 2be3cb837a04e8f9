//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                GET   健康检查
//! - /api/download/command    POST  Start / Stop 命令
//! - /api/download/status     GET   运行中与已结束的任务、最新状态文本
//! - /api/settings            GET   当前语音设置
//! - /api/settings/update     POST  修改语音设置

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/download", download_routes())
        .merge(settings_routes())
}

/// Download 路由
fn download_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/command", post(handlers::download_command))
        .route("/status", get(handlers::download_status))
}

/// Settings 路由
fn settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/settings", get(handlers::get_settings))
        .route("/settings/update", post(handlers::update_settings))
}
