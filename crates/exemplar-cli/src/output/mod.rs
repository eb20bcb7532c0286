//! # Output Formatting
//!
//! Commands print either human-readable text or a single JSON document:
//!
//! ```bash
//! exemplar ledger list                 # aligned, colored text
//! exemplar ledger list --format json   # array of release objects
//! ```
//!
//! Logs always go to stderr, so stdout stays parseable in JSON mode.

mod json;

pub use json::print_json;

/// Output format selected with `--format`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// Single pretty-printed JSON document
    Json,
}

impl OutputFormat {
    /// True for [`OutputFormat::Json`].
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Format of `ledger export`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// One JSON document holding releases and files
    Json,
    /// `<prefix>-example-index.csv` and `<prefix>-example-list.csv`
    Csv,
}
