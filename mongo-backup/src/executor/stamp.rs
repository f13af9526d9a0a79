//! Run timestamp and the artifact names derived from it.

use chrono::{DateTime, Local, NaiveDateTime};

/// `strftime` pattern of the run token, e.g. `20240102_030405`.
pub const TOKEN_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const WORKING_DIR_PREFIX: &str = "backup_";
pub const ARCHIVE_PREFIX: &str = "mongodb_backup_";
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// The instant a run started. Every artifact of the run is named from it.
#[derive(Debug, Clone)]
pub struct RunStamp {
    started_at: DateTime<Local>,
    token: String,
}

impl RunStamp {
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn at(started_at: DateTime<Local>) -> Self {
        Self {
            token: started_at.format(TOKEN_FORMAT).to_string(),
            started_at,
        }
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `backup_<token>`
    pub fn working_dir_name(&self) -> String {
        format!("{}{}", WORKING_DIR_PREFIX, self.token)
    }

    /// `mongodb_backup_<token>.zip`
    pub fn archive_file_name(&self) -> String {
        format!("{}{}{}", ARCHIVE_PREFIX, self.token, ARCHIVE_EXTENSION)
    }

    /// `<token>_<database>_<collection>.json`
    pub fn export_file_name(&self, database: &str, collection: &str) -> String {
        format!(
            "{}_{}_{}.json",
            self.token,
            sanitize_component(database),
            sanitize_component(collection)
        )
    }

    /// `<token>_backup_summary.json`
    pub fn summary_file_name(&self) -> String {
        format!("{}_backup_summary.json", self.token)
    }
}

/// Parse the run time back out of an archive file name.
pub fn parse_archive_file_name(file_name: &str) -> Option<NaiveDateTime> {
    let token = file_name
        .strip_prefix(ARCHIVE_PREFIX)?
        .strip_suffix(ARCHIVE_EXTENSION)?;
    NaiveDateTime::parse_from_str(token, TOKEN_FORMAT).ok()
}

// Percent-encodes path separators, NUL and `%` itself, so distinct names
// always give distinct file names.
fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            '\0' => out.push_str("%00"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> RunStamp {
        RunStamp::at(Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    #[test]
    fn test_artifact_names() {
        let stamp = stamp();
        assert_eq!(stamp.token(), "20240102_030405");
        assert_eq!(stamp.working_dir_name(), "backup_20240102_030405");
        assert_eq!(stamp.archive_file_name(), "mongodb_backup_20240102_030405.zip");
        assert_eq!(
            stamp.export_file_name("shop", "orders"),
            "20240102_030405_shop_orders.json"
        );
        assert_eq!(stamp.summary_file_name(), "20240102_030405_backup_summary.json");
    }

    #[test]
    fn test_export_file_name_has_no_separators() {
        let name = stamp().export_file_name("shop", "a/b\\c");
        assert_eq!(name, "20240102_030405_shop_a%2Fb%5Cc.json");
    }

    #[test]
    fn test_export_file_names_are_distinct() {
        let stamp = stamp();
        let names = ["a/b", "a_b", "a%2Fb", "a\\b", "a\0b"];
        let mut files: Vec<String> = names
            .iter()
            .map(|n| stamp.export_file_name("shop", n))
            .collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), names.len());
    }

    #[test]
    fn test_parse_archive_file_name() {
        let parsed = parse_archive_file_name("mongodb_backup_20240102_030405.zip").unwrap();
        assert_eq!(parsed, stamp().started_at().naive_local());

        assert!(parse_archive_file_name("mongodb_backup_latest.zip").is_none());
        assert!(parse_archive_file_name("backup_20240102_030405").is_none());
        assert!(parse_archive_file_name("mongodb_backup_20240102_030405.tar").is_none());
    }
}
