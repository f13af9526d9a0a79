//! MongoDB Backup Library
//!
//! Exports every collection of a MongoDB database to timestamped JSON files,
//! bundles them into one zip archive, and serves the operation over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod executor;
pub mod fs;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use executor::summary::BackupSummary;
pub use executor::BackupExecutor;
pub use utils::errors::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;
