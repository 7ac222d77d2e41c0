//! Error types for file-level and argument-level failures
//!
//! Row-level problems never surface here: malformed rows are logged and
//! skipped during ingest.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("input file {} not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(
        "unable to parse date '{input}'. Expected format: 'DD MMM YYYY HH:MM' \
         (e.g., '01 Sep 2025 00:00') or 'YYYY-MM-DD HH:MM:SS'"
    )]
    InvalidDate { input: String },

    #[error(
        "invalid time duration format: '{input}'. Expected format like '7d', \
         '24h', '30m', '1.5h', '2h 30m', etc."
    )]
    InvalidDuration { input: String },

    #[error("no valid actions found in the data")]
    NoData,
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
