//! Error types for the backup service.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a backup run (or prevent one from starting).
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Archive error for {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: ArchiveCause,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackupError {
    pub fn archive(path: impl Into<PathBuf>, source: impl Into<ArchiveCause>) -> Self {
        BackupError::Archive {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// A single collection could not be exported.
///
/// The executor catches this per collection and moves on; it only becomes a
/// [`BackupError`] when the exporter is driven directly.
#[derive(Error, Debug)]
#[error("Failed to export collection {collection}: {cause}")]
pub struct ExportError {
    pub collection: String,
    #[source]
    pub cause: ExportCause,
}

impl ExportError {
    pub fn new(collection: impl Into<String>, cause: impl Into<ExportCause>) -> Self {
        Self {
            collection: collection.into(),
            cause: cause.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportCause {
    #[error("read failed: {0}")]
    Read(#[from] mongodb::error::Error),

    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Reported by non-MongoDB document sources.
    #[error("read failed: {0}")]
    Source(String),
}

#[derive(Error, Debug)]
pub enum ArchiveCause {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_names_collection() {
        let err = ExportError::new(
            "orders",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("orders"));
        assert!(msg.contains("denied"));
        assert!(matches!(err.cause, ExportCause::Write(_)));
    }

    #[test]
    fn test_archive_error_names_path() {
        let err = BackupError::archive(
            "/backups/mongodb_backup_x.zip",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        let msg = err.to_string();
        assert!(msg.contains("mongodb_backup_x.zip"));
        assert!(msg.contains("disk full"));
    }
}
