//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected error (also: `ledger check` found nothing) |
//! | 2 | `Usage` | Invalid arguments or configuration |
//! | 3 | `NotFound` | Sources, ledger or release missing |
//! | 4 | `Conflict` | A file is already owned by another release |
//! | 5 | `Validation` | The validation program could not be run |
//! | 6 | `Storage` | Ledger or filesystem failure |
//!
//! ```bash
//! exemplar extract --dialect go ...
//! case $? in
//!     0) echo "harvested" ;;
//!     4) echo "file collision, inspect the ledger" ;;
//!     *) echo "failed" ;;
//! esac
//! ```

use std::fmt;
use std::process::ExitCode;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,
    /// Invalid arguments or configuration (exit code 2).
    Usage = 2,
    /// Requested resource not found (exit code 3).
    NotFound = 3,
    /// Ledger ownership conflict (exit code 4).
    Conflict = 4,
    /// Validation program failure (exit code 5).
    Validation = 5,
    /// Ledger or filesystem failure (exit code 6).
    Storage = 6,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Create an `ExitCode` from this category.
    #[must_use]
    pub fn as_exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }

    /// Short description of this category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Validation => "validation error",
            Self::Storage => "storage error",
        }
    }

    /// Category of a core library error.
    #[must_use]
    pub const fn from_core(err: &exemplar_core::Error) -> Self {
        use exemplar_core::Error;
        match err {
            Error::Config(_) | Error::Parse(_) => Self::Usage,
            Error::NotFound(_) => Self::NotFound,
            Error::Conflict(_) => Self::Conflict,
            Error::Validation(_) => Self::Validation,
            Error::Io(_) | Error::Storage(_) | Error::Ledger(_) => Self::Storage,
            Error::Serialization(_) | Error::Other(_) => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with an explicit category.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create a not-found error.
    pub fn not_found(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::NotFound, source)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Category of an `anyhow::Error`.
///
/// An explicit [`CliError`] wins; otherwise the first core error found in
/// the context chain decides. Anything else is internal.
#[must_use]
pub fn category_of(err: &anyhow::Error) -> ErrorCategory {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.category;
    }
    err.chain()
        .find_map(|cause| cause.downcast_ref::<exemplar_core::Error>())
        .map_or(ErrorCategory::Internal, ErrorCategory::from_core)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErrorCategory::Internal.exit_code(), 1);
        assert_eq!(ErrorCategory::Usage.exit_code(), 2);
        assert_eq!(ErrorCategory::NotFound.exit_code(), 3);
        assert_eq!(ErrorCategory::Conflict.exit_code(), 4);
        assert_eq!(ErrorCategory::Validation.exit_code(), 5);
        assert_eq!(ErrorCategory::Storage.exit_code(), 6);
    }

    #[test]
    fn test_explicit_category_wins() {
        let err = anyhow::Error::new(CliError::usage(anyhow!("--concurrency must be positive")));
        assert_eq!(category_of(&err), ErrorCategory::Usage);
    }

    #[test]
    fn test_core_error_found_through_context() {
        let core: exemplar_core::Result<()> = Err(exemplar_core::Error::Conflict(
            "a/Get.md is already recorded for java#widgets".into(),
        ));
        let err = core.context("recording release").unwrap_err();
        assert_eq!(category_of(&err), ErrorCategory::Conflict);
    }

    #[test]
    fn test_plain_errors_are_internal() {
        assert_eq!(category_of(&anyhow!("boom")), ErrorCategory::Internal);
    }
}
