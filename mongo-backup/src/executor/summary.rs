//! The per-run backup summary.

use super::export::ExportFile;
use super::stamp::RunStamp;
use crate::utils::errors::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// How a run ended, as far as its summary is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupOutcome {
    /// At least one export file was produced
    Completed,
    /// The database has no collections
    NoCollections,
    /// Collections exist, but every one was empty or failed
    NothingExported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCollection {
    pub collection: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSummary {
    /// Run start time (RFC 3339)
    pub timestamp: String,
    /// Token used in every artifact name of this run
    pub run_token: String,
    pub database: String,
    pub outcome: BackupOutcome,
    pub total_collections: usize,
    pub collections_backed_up: Vec<String>,
    pub successful_backups: usize,
    /// Documents written across all export files
    #[serde(default)]
    pub documents_exported: usize,
    /// Bytes written across all export files
    #[serde(default)]
    pub bytes_exported: u64,
    #[serde(default)]
    pub empty_collections: Vec<String>,
    #[serde(default)]
    pub failed_collections: Vec<FailedCollection>,
    pub backup_directory: PathBuf,
    #[serde(default)]
    pub archive_path: Option<PathBuf>,
}

impl BackupSummary {
    pub fn new(stamp: &RunStamp, database: &str, backup_directory: &Path) -> Self {
        Self {
            timestamp: stamp.started_at().to_rfc3339(),
            run_token: stamp.token().to_string(),
            database: database.to_string(),
            outcome: BackupOutcome::NoCollections,
            total_collections: 0,
            collections_backed_up: Vec::new(),
            successful_backups: 0,
            documents_exported: 0,
            bytes_exported: 0,
            empty_collections: Vec::new(),
            failed_collections: Vec::new(),
            backup_directory: backup_directory.to_path_buf(),
            archive_path: None,
        }
    }

    pub fn record_exported(&mut self, file: &ExportFile) {
        self.collections_backed_up.push(file.collection.clone());
        self.successful_backups += 1;
        self.documents_exported += file.document_count;
        self.bytes_exported += file.size_bytes;
    }

    pub fn record_empty(&mut self, collection: &str) {
        self.empty_collections.push(collection.to_string());
    }

    pub fn record_failed(&mut self, error: &ExportError) {
        self.failed_collections.push(FailedCollection {
            collection: error.collection.clone(),
            error: error.cause.to_string(),
        });
    }

    /// Settle `outcome` from the counters.
    pub fn finish(&mut self) {
        self.outcome = if self.total_collections == 0 {
            BackupOutcome::NoCollections
        } else if self.successful_backups == 0 {
            BackupOutcome::NothingExported
        } else {
            BackupOutcome::Completed
        };
    }

    /// Fraction of collections exported; 1.0 when there was nothing to export.
    pub fn success_ratio(&self) -> f64 {
        if self.total_collections == 0 {
            1.0
        } else {
            self.successful_backups as f64 / self.total_collections as f64
        }
    }

    /// Write the summary as pretty JSON to `dir/<file_name>`.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        let path = dir.join(file_name);
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');

        let mut file = std::fs::File::create(&path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;

        Ok(path)
    }
}
