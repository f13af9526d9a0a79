//! Backup trigger endpoint.

use super::AppState;
use crate::db::Connector;
use crate::executor::summary::BackupSummary;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct TriggerBackupResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BackupSummary>,
}

impl TriggerBackupResponse {
    fn success(summary: BackupSummary) -> Self {
        Self {
            status: "success",
            message: "Backup executed successfully".to_string(),
            summary: Some(summary),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            summary: None,
        }
    }
}

/// POST /trigger_backup - Run a backup and report its summary
///
/// The run executes on its own task, so a client that disconnects does not
/// cancel it halfway.
pub async fn trigger_backup<C: Connector>(
    State(state): State<AppState<C>>,
) -> (StatusCode, Json<TriggerBackupResponse>) {
    let Some(permit) = state.run_guard.try_acquire() else {
        tracing::warn!("Backup trigger rejected: a run is already in progress");
        return (
            StatusCode::CONFLICT,
            Json(TriggerBackupResponse::error(
                "A backup run is already in progress",
            )),
        );
    };

    tracing::info!("Backup triggered");
    let executor = Arc::clone(&state.executor);
    let handle = tokio::spawn(async move {
        let _permit = permit;
        executor.run().await
    });

    match handle.await {
        Ok(Ok(summary)) => (
            StatusCode::OK,
            Json(TriggerBackupResponse::success(summary)),
        ),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TriggerBackupResponse::error(format!("Backup failed: {}", e))),
        ),
        Err(e) => {
            tracing::error!("Backup task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerBackupResponse::error("Backup failed: internal error")),
            )
        }
    }
}
