//! # exemplar-core
//!
//! Core functionality for exemplar: harvesting per-example documentation
//! snippets out of generated SDK sample files.
//!
//! SDK generators emit *aggregated samples*: one source file holding many
//! demonstration routines, each preceded by a marker comment naming the
//! specification example it demonstrates. This crate splits such files into
//! units, rebuilds every unit as a standalone file, gates it through a
//! validation oracle, renders it as markdown and records the published release
//! in a SQLite ledger so a release is never harvested twice.
//!
//! ## Architecture
//!
//! - **Dialects**: one immutable rule set per supported language ([`Dialect`])
//! - **Scanning and segmentation**: pure line-level passes ([`scan`], [`segment`])
//! - **Reconstruction**: prologue, body and epilogue reassembly ([`reconstruct`])
//! - **Output**: path mapping and markdown rendering ([`paths`], [`markdown`])
//! - **Pipeline**: bounded concurrent harvesting of a directory ([`Harvester`])
//! - **Ledger**: idempotent release bookkeeping ([`Ledger`])
//!
//! ## Quick Start
//!
//! ```rust
//! use exemplar_core::{Dialect, extract_units};
//!
//! let sample = "\
//! package armwidgets_test
//!
//! // x-ms-original-file: specification/widgets/examples/Widgets_Get.json
//! func ExampleWidgetsClient_Get() {
//! }
//! ";
//! let units = extract_units(sample, Dialect::Go.rules(), "widgets_test");
//! assert_eq!(units.len(), 1);
//! assert_eq!(
//!     units[0].target.markdown_path(),
//!     "specification/widgets/examples-go/Widgets_Get.md"
//! );
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`]. Malformed units and
//! validation rejections are not errors; they are dropped and counted in the
//! [`HarvestReport`].

/// Configuration loading and defaults
pub mod config;
/// Per-dialect segmentation rules
pub mod dialect;
/// Error types and result aliases
pub mod error;
/// SQLite release ledger
pub mod ledger;
/// Markdown rendering of reconstructed units
pub mod markdown;
/// Validation oracles
pub mod oracle;
/// Spec reference to output path mapping
pub mod paths;
/// Directory harvesting
pub mod pipeline;
/// Standalone source reconstruction
pub mod reconstruct;
/// Marker comment scanning
pub mod scan;
/// Unit segmentation
pub mod segment;
/// Release and ledger record types
pub mod types;

// Re-export commonly used types
pub use config::{Config, DocsConfig, LedgerConfig, ValidationConfig};
pub use dialect::{Dialect, DialectRules, PrologueCut};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use markdown::MarkdownEmitter;
pub use oracle::{AcceptAll, Candidate, CommandOracle, ValidationOracle, Verdict};
pub use paths::{TargetPath, map_target};
pub use pipeline::{
    ExampleArtifact, Harvest, HarvestReport, Harvester, ReconstructedUnit, extract_units,
    write_artifacts,
};
pub use segment::{AggregatedSample, ExampleUnit, next_unit, split_lines};
pub use types::*;
