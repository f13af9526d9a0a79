//! HTTP API module for the backup service.

pub mod backup;
pub mod health;
pub mod run_guard;

use crate::db::Connector;
use crate::executor::BackupExecutor;
use axum::{
    routing::{get, post},
    Router,
};
use run_guard::RunGuard;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
pub struct AppState<C> {
    pub executor: Arc<BackupExecutor<C>>,
    pub run_guard: RunGuard,
}

// Manual impl: `C` itself need not be `Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            run_guard: self.run_guard.clone(),
        }
    }
}

impl<C: Connector> AppState<C> {
    pub fn new(executor: BackupExecutor<C>) -> Self {
        Self {
            executor: Arc::new(executor),
            run_guard: RunGuard::new(),
        }
    }
}

/// Create the API router with all endpoints
pub fn create_router<C: Connector>(state: AppState<C>) -> Router {
    Router::new()
        .route("/", get(health::health::<C>))
        .route("/trigger_backup", post(backup::trigger_backup::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
