//! Optional retention sweep over the archive storage root.
//!
//! Only files named like `mongodb_backup_<token>.zip` are considered; the
//! age of an archive is read from its name, not from filesystem metadata.

use super::stamp::parse_archive_file_name;
use chrono::{Duration, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Delete archives in `storage_root` that are older than `retention_days`
/// relative to `now`. Returns the removed paths.
///
/// Never fails: unreadable directories and undeletable files are logged.
pub fn sweep(storage_root: &Path, retention_days: u32, now: NaiveDateTime) -> Vec<PathBuf> {
    let Some(cutoff) = Duration::try_days(i64::from(retention_days))
        .and_then(|age| now.checked_sub_signed(age))
    else {
        warn!(
            "[Retention] {} days reaches past the earliest representable date, skipping sweep",
            retention_days
        );
        return Vec::new();
    };

    let entries = match std::fs::read_dir(storage_root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("[Retention] Cannot read {}: {}", storage_root.display(), e);
            return Vec::new();
        }
    };

    let mut expired: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| {
            parse_archive_file_name(&e.file_name().to_string_lossy())
                .is_some_and(|created| created < cutoff)
        })
        .map(|e| e.path())
        .collect();
    expired.sort();

    expired
        .into_iter()
        .filter(|path| match std::fs::remove_file(path) {
            Ok(()) => {
                info!("[Retention] Removed old archive: {}", path.display());
                true
            }
            Err(e) => {
                warn!("[Retention] Could not remove {}: {}", path.display(), e);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_sweep_removes_only_expired_archives() {
        let root = TempDir::new().unwrap();
        let old = root.path().join("mongodb_backup_20240101_000000.zip");
        let recent = root.path().join("mongodb_backup_20240330_000000.zip");
        let unrelated = root.path().join("notes_20200101_000000.zip");
        let working_dir = root.path().join("backup_20200101_000000");
        fs::write(&old, b"old").unwrap();
        fs::write(&recent, b"recent").unwrap();
        fs::write(&unrelated, b"keep").unwrap();
        fs::create_dir(&working_dir).unwrap();

        let removed = sweep(root.path(), 30, now());

        assert_eq!(removed, vec![old.clone()]);
        assert!(!old.exists());
        assert!(recent.exists());
        assert!(unrelated.exists());
        assert!(working_dir.exists());
    }

    #[test]
    fn test_sweep_with_huge_retention_keeps_everything() {
        let root = TempDir::new().unwrap();
        let old = root.path().join("mongodb_backup_20000101_000000.zip");
        fs::write(&old, b"old").unwrap();

        assert!(sweep(root.path(), u32::MAX, now()).is_empty());
        assert!(old.exists());
    }

    #[test]
    fn test_sweep_missing_root_is_noop() {
        let root = TempDir::new().unwrap();
        assert!(sweep(&root.path().join("missing"), 30, now()).is_empty());
    }
}
