//! MongoDB Backup Service - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use mongo_backup::{api, config::Config, db::MongoConnector, utils, BackupExecutor};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a .env file (defaults to ./.env when present)
    #[arg(short, long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Seed the environment before anything reads it
    match &args.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    // Initialize logging
    let log_level = args
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());
    utils::logger::init(&log_level)?;

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };
    if let Some(port) = args.port {
        config.http.port = port;
    }

    tracing::info!(
        "Starting mongo-backup v{} (database: {}, storage: {})",
        env!("CARGO_PKG_VERSION"),
        config.mongo.database,
        config.backup.base_dir.display()
    );
    if !config.backup.retention_enabled {
        tracing::debug!(
            "Retention sweep disabled (BACKUP_RETENTION_DAYS={})",
            config.backup.retention_days
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http.port));
    let connector = MongoConnector::new(Duration::from_secs(config.mongo.connect_timeout_secs));
    let state = api::AppState::new(BackupExecutor::new(connector, config));
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health endpoint: http://{}/", addr);
    tracing::info!("Trigger endpoint: POST http://{}/trigger_backup", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
