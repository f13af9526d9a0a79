//! Archiver: packages a working directory into one zip file.

use super::stamp::RunStamp;
use crate::fs::walker::walk_directory;
use crate::utils::errors::{ArchiveCause, BackupError, Result};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zip every file under `working_dir` into `mongodb_backup_<token>.zip`,
/// placed next to `working_dir`, keeping paths relative to it.
///
/// The archive is staged under a temporary name and renamed into place, so
/// a failed run never leaves a truncated archive behind. `working_dir` is
/// not touched.
pub fn archive(working_dir: &Path, stamp: &RunStamp) -> Result<PathBuf> {
    let storage_root = working_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let archive_path = storage_root.join(stamp.archive_file_name());

    write_archive(working_dir, storage_root, &archive_path)
        .map_err(|cause| BackupError::archive(&archive_path, cause))?;

    info!("Archive created: {}", archive_path.display());
    Ok(archive_path)
}

fn write_archive(
    working_dir: &Path,
    storage_root: &Path,
    archive_path: &Path,
) -> std::result::Result<(), ArchiveCause> {
    let files = walk_directory(working_dir)?;
    let total_bytes: u64 = files.iter().map(|f| f.size).sum();
    info!("Archiving {} files ({} bytes)", files.len(), total_bytes);

    let staged = tempfile::Builder::new()
        .prefix(".archive-")
        .suffix(".partial")
        .tempfile_in(storage_root)?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(staged);
    for file in &files {
        let name = file.archive_name();
        debug!("Adding {} ({} bytes)", name, file.size);

        zip.start_file(name, options)?;
        let mut reader = BufReader::new(File::open(&file.path)?);
        std::io::copy(&mut reader, &mut zip)?;
    }

    let mut staged = zip.finish()?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(archive_path).map_err(|e| e.error)?;

    Ok(())
}

/// Remove `working_dir` and everything in it.
///
/// Failures are logged and swallowed; returns whether the directory is gone.
pub fn cleanup(working_dir: &Path) -> bool {
    match std::fs::remove_dir_all(working_dir) {
        Ok(()) => {
            info!("Working directory removed: {}", working_dir.display());
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!(
                "Could not remove working directory {}: {}",
                working_dir.display(),
                e
            );
            false
        }
    }
}
