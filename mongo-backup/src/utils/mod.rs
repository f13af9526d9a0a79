//! Utility modules for the backup service.

pub mod errors;
pub mod logger;

pub use errors::{BackupError, ExportError, Result};
