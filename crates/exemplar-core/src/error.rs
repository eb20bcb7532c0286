//! Error types and handling for exemplar-core operations.
//!
//! Expected data-quality conditions never surface here: malformed units are
//! dropped by the segmenter, rejected units are dropped by the pipeline, and a
//! release that is already recorded is reported as
//! [`RecordOutcome::Duplicate`](crate::RecordOutcome::Duplicate).
//! What remains are genuine failures the caller has to decide about.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: reading aggregated samples, writing markdown artifacts
//! - **Ledger Errors**: SQLite statements and transactions
//! - **Conflict Errors**: an output path already owned by another release
//! - **Configuration Errors**: unreadable or invalid TOML settings
//! - **Validation Errors**: the validation oracle could not be run at all
//!
//! ```rust
//! use exemplar_core::{Error, Result};
//!
//! fn handle(result: Result<()>) {
//!     match result {
//!         Err(e) if e.is_recoverable() => eprintln!("retry the run: {e}"),
//!         Err(e) => eprintln!("[{}] {e}", e.category()),
//!         Ok(()) => {},
//!     }
//! }
//! # handle(Ok(()));
//! ```

use thiserror::Error;

/// The main error type for exemplar-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading source files, walking source directories and writing
    /// markdown artifacts.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input could not be interpreted.
    ///
    /// Used for unknown dialect names, unparseable timestamps and similar
    /// caller-supplied values. Never used for malformed sample content.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Filesystem storage around the ledger failed.
    ///
    /// Covers creating the ledger directory and acquiring the writer lock.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A ledger statement or transaction failed.
    ///
    /// The enclosing transaction has been rolled back, so the ledger still
    /// holds its prior state.
    #[error("Ledger error: {0}")]
    Ledger(#[from] rusqlite::Error),

    /// An output path is already recorded for a different release.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The validation oracle could not produce a verdict.
    ///
    /// A rejection is not an error; this variant means the oracle itself
    /// failed, for example because its program could not be spawned.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away when the whole run is retried.
    ///
    /// Busy or locked databases and interrupted I/O are transient; everything
    /// else needs a change in input or environment first.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
            ),
            Self::Ledger(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Get the error category as a string, for logging and JSON output.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Storage(_) => "storage",
            Self::Ledger(_) => "ledger",
            Self::Conflict(_) => "conflict",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
