//! Health check endpoint.

use super::AppState;
use crate::db::Connector;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

pub const SERVICE_NAME: &str = "MongoDB Backup Service";

/// GET / - Health check endpoint
pub async fn health<C: Connector>(State(state): State<AppState<C>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "message": "Service is running properly",
        "version": env!("CARGO_PKG_VERSION"),
        "backup_in_progress": state.run_guard.is_running(),
    }))
}
