//! Collection exporter.

use crate::db::extjson;
use crate::db::Connection;
use crate::utils::errors::{ExportCause, ExportError};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An export file that was completely written.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub collection: String,
    pub path: PathBuf,
    pub document_count: usize,
    pub size_bytes: u64,
}

/// Result of exporting one collection that did not fail.
#[derive(Debug)]
pub enum ExportOutcome {
    Written(ExportFile),
    /// The collection had no documents; nothing was written.
    Empty,
}

/// Read every document of `collection` and write them to `destination` as a
/// JSON array of canonical Extended JSON.
///
/// The file is staged next to `destination` and renamed into place, so on
/// failure no file exists at `destination`. An existing file at
/// `destination` is never replaced; that is reported as a write failure.
pub async fn export_collection<C: Connection>(
    connection: &C,
    database: &str,
    collection: &str,
    destination: &Path,
) -> Result<ExportOutcome, ExportError> {
    let documents = connection
        .fetch_documents(database, collection)
        .await
        .map_err(|cause| ExportError::new(collection, cause))?;

    if documents.is_empty() {
        info!("Collection {} is empty", collection);
        return Ok(ExportOutcome::Empty);
    }

    let document_count = documents.len();
    let encoded = extjson::encode_documents(documents);

    let target = destination.to_path_buf();
    let size_bytes = tokio::task::spawn_blocking(move || write_atomically(&target, &encoded))
        .await
        .map_err(|e| ExportError::new(collection, std::io::Error::other(e)))?
        .map_err(|cause| ExportError::new(collection, cause))?;

    info!(
        "Collection {} saved to {} ({} documents)",
        collection,
        destination.display(),
        document_count
    );

    Ok(ExportOutcome::Written(ExportFile {
        collection: collection.to_string(),
        path: destination.to_path_buf(),
        document_count,
        size_bytes,
    }))
}

fn write_atomically(destination: &Path, value: &serde_json::Value) -> Result<u64, ExportCause> {
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let staged = tempfile::Builder::new()
        .prefix(".export-")
        .suffix(".partial")
        .tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(staged.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    staged.as_file().sync_all()?;

    let size = staged.as_file().metadata()?.len();
    staged.persist_noclobber(destination).map_err(|e| e.error)?;

    debug!("Wrote {} bytes to {}", size, destination.display());
    Ok(size)
}
