//! # CLI Structure and Argument Parsing
//!
//! Command-line interface for `exemplar`, built with `clap` derive macros.
//!
//! ```bash
//! # Harvest Go samples of one release into a specs checkout
//! exemplar extract --dialect go --sources sdk/resourcemanager/widgets/armwidgets \
//!     --output ../azure-rest-api-specs-examples \
//!     --tag sdk/resourcemanager/widgets/armwidgets/v1.2.0 \
//!     --package sdk/resourcemanager/widgets/armwidgets --release-version v1.2.0
//!
//! # Inspect how one file is segmented
//! exemplar split widgets_client_example_test.go
//!
//! # Ledger bookkeeping
//! exemplar ledger list --language java
//! exemplar ledger export --output metadata.json
//! ```
//!
//! Global options (`--verbose`, `--quiet`, `--config`, `--no-color`) apply to
//! every command. Commands that print results accept `--format text|json`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use exemplar_core::{Dialect, DuplicatePolicy};

use crate::output::{ExportFormat, OutputFormat};

/// Main CLI structure for the `exemplar` command
#[derive(Parser, Clone, Debug)]
#[command(name = "exemplar")]
#[command(version)]
#[command(about = "exemplar - harvest per-example SDK snippets from aggregated samples", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to configuration file (overrides autodiscovery). Also via `EXEMPLAR_CONFIG`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available subcommands for the `exemplar` CLI
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Harvest a release: segment, validate, write markdown and record it
    Extract(ExtractArgs),

    /// Show the units found in a single aggregated sample
    Split {
        /// Source file to segment
        file: PathBuf,
        /// Dialect of the file (detected from the extension when omitted)
        #[arg(long)]
        dialect: Option<Dialect>,
        /// Print the reconstructed code of every unit
        #[arg(long)]
        code: bool,
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Inspect and maintain the release ledger
    Ledger {
        /// Ledger file (defaults to the configured path)
        #[arg(long, global = true, value_name = "FILE")]
        ledger: Option<PathBuf>,
        #[command(subcommand)]
        command: LedgerCommands,
    },
}

/// Arguments of `exemplar extract`
#[derive(Args, Clone, Debug)]
pub struct ExtractArgs {
    /// Dialect of the aggregated samples
    #[arg(long)]
    pub dialect: Dialect,

    /// Directory holding the aggregated samples
    #[arg(long, value_name = "DIR")]
    pub sources: PathBuf,

    /// Root directory the markdown artifacts are written below
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    /// Release tag in the SDK repository
    #[arg(long)]
    pub tag: String,

    /// SDK package name
    #[arg(long)]
    pub package: String,

    /// SDK package version
    #[arg(long = "release-version", value_name = "VERSION")]
    pub release_version: String,

    /// SDK directory name used in documentation links (derived from the package when omitted)
    #[arg(long)]
    pub sdk_name: Option<String>,

    /// Ledger name of the release (dialect convention when omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Publication time, RFC 3339 (defaults to now)
    #[arg(long, value_name = "RFC3339")]
    pub published_at: Option<String>,

    /// Program run against every reconstructed unit; non-zero exit rejects it
    #[arg(long, value_name = "PROGRAM")]
    pub validate: Option<String>,

    /// Argument for the validation program; `{file}` and `{dir}` are substituted
    #[arg(long = "validate-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub validate_args: Vec<String>,

    /// Files processed concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// What to do when the release is already recorded
    #[arg(long = "on-duplicate", value_name = "POLICY")]
    pub on_duplicate: Option<DuplicatePolicy>,

    /// Ledger file (defaults to the configured path)
    #[arg(long, value_name = "FILE")]
    pub ledger: Option<PathBuf>,

    /// Segment and validate, but write nothing and record nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Subcommands of `exemplar ledger`
#[derive(Subcommand, Clone, Debug)]
pub enum LedgerCommands {
    /// Create the ledger schema (idempotent)
    Init,

    /// List recorded releases
    List {
        /// Only releases of this language (`go`, `js`, `java`)
        #[arg(long)]
        language: Option<String>,
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check whether a release is recorded; exits 1 when it is not
    Check {
        name: String,
        language: String,
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the files recorded for a release
    Files {
        name: String,
        language: String,
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a release and its files from the ledger
    Remove { name: String, language: String },

    /// Export releases and files as metadata (JSON document or CSV pair)
    Export {
        /// Only releases of this language
        #[arg(long)]
        language: Option<String>,
        /// JSON: file to write instead of stdout. CSV: directory receiving both files
        #[arg(long, value_name = "PATH", required_if_eq("format", "csv"))]
        output: Option<PathBuf>,
        /// File name prefix of the CSV pair (`<prefix>-example-index.csv`)
        #[arg(long, default_value = "java-library")]
        prefix: String,
        #[arg(short = 'f', long, value_enum, default_value = "json")]
        format: ExportFormat,
    },
}

impl Cli {
    /// Output format of the selected command, if it has one.
    pub fn format(&self) -> Option<OutputFormat> {
        match &self.command {
            Commands::Extract(args) => Some(args.format),
            Commands::Split { format, .. } => Some(*format),
            Commands::Ledger { command, .. } => match command {
                LedgerCommands::List { format, .. }
                | LedgerCommands::Check { format, .. }
                | LedgerCommands::Files { format, .. } => Some(*format),
                LedgerCommands::Export { format, output, .. } => {
                    (*format == ExportFormat::Json && output.is_none()).then_some(OutputFormat::Json)
                },
                LedgerCommands::Init | LedgerCommands::Remove { .. } => None,
            },
        }
    }
}
