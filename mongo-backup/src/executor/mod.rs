//! Backup executor - drives one backup run end to end.
//!
//! A run walks through the phases of [`RunPhase`]:
//! connect, create the working directory, enumerate collections, export
//! each one, write the summary, archive, and remove the working directory.
//! A failing collection is recorded and skipped; only configuration,
//! connection, enumeration and archiving errors end a run early. The
//! connection is closed on every path once it has been opened.

pub mod archive;
pub mod export;
pub mod retention;
pub mod stamp;
pub mod summary;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::Config;
use crate::db::{Connection, Connector};
use crate::utils::errors::{BackupError, Result};
use export::{export_collection, ExportOutcome};
use stamp::RunStamp;
use std::fmt;
use std::path::{Path, PathBuf};
use summary::BackupSummary;
use tracing::{debug, error, info, warn, Instrument};

pub use summary::{BackupOutcome, FailedCollection};

/// States of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Initializing,
    Connecting,
    Enumerating,
    Exporting,
    Summarizing,
    Archiving,
    Cleaning,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Initializing => "initializing",
            RunPhase::Connecting => "connecting",
            RunPhase::Enumerating => "enumerating",
            RunPhase::Exporting => "exporting",
            RunPhase::Summarizing => "summarizing",
            RunPhase::Archiving => "archiving",
            RunPhase::Cleaning => "cleaning",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(phase: RunPhase) {
    debug!(%phase, "Entering phase");
}

/// Main backup executor
pub struct BackupExecutor<C> {
    connector: C,
    config: Config,
}

impl<C: Connector> BackupExecutor<C> {
    pub fn new(connector: C, config: Config) -> Self {
        Self { connector, config }
    }

    /// Execute one backup run starting now.
    pub async fn run(&self) -> Result<BackupSummary> {
        self.run_at(RunStamp::now()).await
    }

    /// Execute one backup run whose artifacts are named from `stamp`.
    pub async fn run_at(&self, stamp: RunStamp) -> Result<BackupSummary> {
        let span = tracing::info_span!("backup_run", run = %stamp.token());
        self.execute(stamp).instrument(span).await
    }

    async fn execute(&self, stamp: RunStamp) -> Result<BackupSummary> {
        enter(RunPhase::Initializing);
        info!("Starting backup of database {}", self.config.mongo.database);
        self.config.validate()?;

        enter(RunPhase::Connecting);
        let mut connection = match self.connector.connect(&self.config.mongo.uri).await {
            Ok(connection) => connection,
            Err(e) => {
                enter(RunPhase::Failed);
                error!("Error connecting to MongoDB: {}", e);
                return Err(e);
            }
        };

        let result = self.execute_connected(&connection, &stamp).await;
        connection.close().await;

        match &result {
            Ok(summary) => {
                enter(RunPhase::Done);
                info!(
                    "Backup finished: {}/{} collections exported ({:.0}%, {} documents, {} bytes, {:?})",
                    summary.successful_backups,
                    summary.total_collections,
                    summary.success_ratio() * 100.0,
                    summary.documents_exported,
                    summary.bytes_exported,
                    summary.outcome
                );
            }
            Err(e) => error!("Backup failed: {}", e),
        }
        result
    }

    async fn execute_connected(
        &self,
        connection: &C::Connection,
        stamp: &RunStamp,
    ) -> Result<BackupSummary> {
        let database = self.config.mongo.database.as_str();
        let working_dir = {
            let base_dir = self.config.backup.base_dir.clone();
            let name = stamp.working_dir_name();
            blocking(move || create_working_dir(&base_dir, &name)).await?
        };
        let mut summary = BackupSummary::new(stamp, database, &working_dir);

        enter(RunPhase::Enumerating);
        let collections = match connection.list_collections(database).await {
            Ok(collections) => collections,
            Err(e) => {
                enter(RunPhase::Failed);
                // Nothing has been written yet; drop the empty directory rather than leave a stray.
                let dir = working_dir.clone();
                let _ = blocking(move || Ok(archive::cleanup(&dir))).await;
                return Err(e);
            }
        };
        summary.total_collections = collections.len();

        if collections.is_empty() {
            warn!("No collections found in database {}", database);
        } else {
            info!(
                "Found {} collections to back up: {:?}",
                collections.len(),
                collections
            );
        }

        enter(RunPhase::Exporting);
        for collection in &collections {
            let destination = working_dir.join(stamp.export_file_name(database, collection));
            match export_collection(connection, database, collection, &destination).await {
                Ok(ExportOutcome::Written(file)) => summary.record_exported(&file),
                Ok(ExportOutcome::Empty) => summary.record_empty(collection),
                Err(e) => {
                    error!("{}", e);
                    summary.record_failed(&e);
                }
            }
        }

        enter(RunPhase::Summarizing);
        summary.finish();
        let summary_path = {
            let snapshot = summary.clone();
            let working_dir = working_dir.clone();
            let file_name = stamp.summary_file_name();
            blocking(move || snapshot.write_to(&working_dir, &file_name)).await?
        };
        info!("Backup summary saved to {}", summary_path.display());

        if summary.successful_backups == 0 {
            warn!(
                "No export files produced; keeping {} without archiving",
                working_dir.display()
            );
            return Ok(summary);
        }

        enter(RunPhase::Archiving);
        let archive_path = {
            let working_dir = working_dir.clone();
            let stamp = stamp.clone();
            blocking(move || archive::archive(&working_dir, &stamp)).await?
        };
        summary.archive_path = Some(archive_path);

        enter(RunPhase::Cleaning);
        {
            let working_dir = working_dir.clone();
            if let Err(e) = blocking(move || Ok(archive::cleanup(&working_dir))).await {
                warn!("Working directory cleanup aborted: {}", e);
            }
        }

        if self.config.backup.retention_enabled {
            let root = self.config.backup.base_dir.clone();
            let days = self.config.backup.retention_days;
            let now = stamp.started_at().naive_local();
            // The archive already exists; a sweep problem must not fail the run.
            match blocking(move || Ok(retention::sweep(&root, days, now))).await {
                Ok(removed) if !removed.is_empty() => {
                    info!("[Retention] Removed {} archives older than {} days", removed.len(), days);
                }
                Ok(_) => {}
                Err(e) => warn!("[Retention] Sweep aborted: {}", e),
            }
        }

        Ok(summary)
    }
}

/// Create `<base_dir>/<name>`; refuses to reuse an existing one.
fn create_working_dir(base_dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(base_dir)?;
    let working_dir = base_dir.join(name);
    std::fs::create_dir(&working_dir)?;
    info!("Working directory created: {}", working_dir.display());
    Ok(working_dir)
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BackupError::Io(std::io::Error::other(e)))?
}
