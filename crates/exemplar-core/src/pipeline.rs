//! Harvest pipeline: sources directory in, markdown artifacts out.
//!
//! ```text
//! discover ─▶ scan ─▶ segment ─▶ reconstruct ─▶ validate ─▶ render ─▶ emit
//! ```
//!
//! Everything up to validation is pure and runs per file on a bounded worker
//! pool. Unit order inside a file is preserved, and the final artifact list is
//! sorted by source file and unit index, so results do not depend on
//! scheduling.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::dialect::{Dialect, DialectRules};
use crate::markdown::MarkdownEmitter;
use crate::oracle::{Candidate, ValidationOracle, Verdict};
use crate::paths::{TargetPath, map_target};
use crate::reconstruct::{dialect_rename, reconstruct};
use crate::scan::is_aggregated_sample;
use crate::segment::{AggregatedSample, split_lines};
use crate::types::ReleaseInfo;
use crate::{Error, Result};

const DEFAULT_CONCURRENCY: usize = 4;

/// Directory names never descended into during discovery.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

/// A valid unit rebuilt into a standalone source file, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconstructedUnit {
    /// Position of the unit among the units of its file.
    pub unit_index: usize,
    /// Specification example the unit demonstrates.
    pub spec_reference: String,
    /// Where the markdown artifact goes.
    pub target: TargetPath,
    /// First line of the unit body (0-based).
    pub start_line: usize,
    /// Line after the unit body (0-based).
    pub end_line: usize,
    /// Standalone source file rebuilt from the unit.
    pub code: String,
}

/// Segment and reconstruct every valid unit of one source file.
///
/// `source_symbol` is the shared symbol renamed by dialects that need it,
/// conventionally the file stem. Pure; no I/O.
pub fn extract_units(text: &str, rules: &DialectRules, source_symbol: &str) -> Vec<ReconstructedUnit> {
    let lines = split_lines(text);
    if !is_aggregated_sample(&lines, rules) {
        return Vec::new();
    }

    let sample = AggregatedSample::from_lines(&lines, rules);
    let rename = dialect_rename(rules, source_symbol);
    sample
        .units
        .iter()
        .enumerate()
        .filter_map(|(unit_index, unit)| {
            let spec_reference = unit.spec_reference.clone()?;
            let target = map_target(&spec_reference, rules.dir_suffix);
            Some(ReconstructedUnit {
                unit_index,
                target,
                start_line: unit.start_line,
                end_line: unit.end_line,
                code: reconstruct(&sample, unit, rules, rename).concat(),
                spec_reference,
            })
        })
        .collect()
}

/// One accepted unit, rendered and ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleArtifact {
    /// Output directory relative to the output root.
    pub target_dir: String,
    /// File name of the artifact without `.md`.
    pub target_stem: String,
    /// Rendered markdown.
    pub content: String,
    /// Specification example the unit demonstrates.
    pub spec_reference: String,
    /// Aggregated sample the unit came from.
    pub source_file: PathBuf,
    /// Position of the unit among the units of its file.
    pub unit_index: usize,
}

impl ExampleArtifact {
    /// Output path relative to the output root, `/`-separated.
    pub fn relative_path(&self) -> String {
        TargetPath {
            dir: self.target_dir.clone(),
            stem: self.target_stem.clone(),
        }
        .markdown_path()
    }
}

/// Counters for one harvest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    /// Source files read.
    pub files_scanned: usize,
    /// Files containing at least one marker.
    pub aggregated_files: usize,
    /// Valid units found.
    pub units_found: usize,
    /// Units accepted and kept as artifacts.
    pub accepted: usize,
    /// Units rejected by the validation oracle.
    pub rejected: usize,
    /// Units dropped for an unusable target path or a duplicate target.
    pub skipped: usize,
    /// Artifacts written to disk, set by the caller.
    pub written: usize,
}

/// Artifacts of a harvest run plus its counters.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Accepted artifacts, sorted by source file and unit index.
    pub artifacts: Vec<ExampleArtifact>,
    /// Counters of the run.
    pub report: HarvestReport,
}

#[derive(Debug, Default)]
struct FileOutcome {
    aggregated: bool,
    units_found: usize,
    rejected: usize,
    skipped: usize,
    artifacts: Vec<ExampleArtifact>,
}

/// Turns a directory of aggregated samples into markdown artifacts.
pub struct Harvester<O: ValidationOracle> {
    dialect: Dialect,
    emitter: MarkdownEmitter,
    oracle: O,
    concurrency: usize,
}

impl<O: ValidationOracle> Harvester<O> {
    /// Harvester for `release` using the dialect's default link template.
    pub fn new(dialect: Dialect, release: &ReleaseInfo, oracle: O) -> Self {
        Self {
            dialect,
            emitter: MarkdownEmitter::new(dialect.rules(), release, None),
            oracle,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Use a documentation link template other than the dialect default.
    #[must_use]
    pub fn with_link_template(mut self, release: &ReleaseInfo, template: Option<&str>) -> Self {
        self.emitter = MarkdownEmitter::new(self.dialect.rules(), release, template);
        self
    }

    /// Number of files processed at once; at least one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Dialect of the harvested sources.
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Renderer used for accepted units.
    pub fn emitter(&self) -> &MarkdownEmitter {
        &self.emitter
    }

    /// Source files below `root` accepted by the dialect's file filter, sorted.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::NotFound(format!(
                "sources directory {} does not exist",
                root.display()
            )));
        }
        let rules = self.dialect.rules();
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let name = entry.file_name();
                let name = name.to_string_lossy();
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    if !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref()) {
                        pending.push(path);
                    }
                } else if file_type.is_file() && rules.accepts_file_name(&name) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Discover, segment, reconstruct and validate everything below `sources`.
    ///
    /// Rejected and malformed units are dropped and counted; an oracle that
    /// cannot run aborts the whole harvest.
    #[instrument(skip(self), fields(dialect = %self.dialect))]
    pub async fn harvest(&self, sources: &Path) -> Result<Harvest> {
        let files = self.discover(sources)?;
        info!(files = files.len(), "scanning source files");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let outcomes: Vec<(PathBuf, Result<FileOutcome>)> = stream::iter(files)
            .map(|path| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = semaphore.acquire().await;
                    let outcome = self.process_file(&path).await;
                    (path, outcome)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut harvest = Harvest::default();
        for (path, outcome) in outcomes {
            let outcome = outcome.map_err(|e| {
                warn!(file = %path.display(), error = %e, "harvest aborted");
                e
            })?;
            harvest.report.files_scanned += 1;
            harvest.report.aggregated_files += usize::from(outcome.aggregated);
            harvest.report.units_found += outcome.units_found;
            harvest.report.rejected += outcome.rejected;
            harvest.report.skipped += outcome.skipped;
            harvest.artifacts.extend(outcome.artifacts);
        }

        harvest
            .artifacts
            .sort_by(|a, b| (&a.source_file, a.unit_index).cmp(&(&b.source_file, b.unit_index)));

        let mut seen = HashSet::new();
        let before = harvest.artifacts.len();
        harvest.artifacts.retain(|artifact| {
            let path = artifact.relative_path();
            if seen.insert(path.clone()) {
                true
            } else {
                warn!(
                    target_path = %path,
                    source = %artifact.source_file.display(),
                    "duplicate target path, keeping the first unit"
                );
                false
            }
        });
        harvest.report.skipped += before - harvest.artifacts.len();
        harvest.report.accepted = harvest.artifacts.len();

        info!(
            files = harvest.report.files_scanned,
            units = harvest.report.units_found,
            accepted = harvest.report.accepted,
            rejected = harvest.report.rejected,
            "harvest complete"
        );
        Ok(harvest)
    }

    async fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(file = %path.display(), "skipping file that is not UTF-8");
                return Ok(FileOutcome::default());
            },
            Err(e) => return Err(e.into()),
        };

        let rules = self.dialect.rules();
        let source_symbol = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let units = extract_units(&text, rules, &source_symbol);

        let mut outcome = FileOutcome {
            aggregated: !units.is_empty() || is_aggregated_sample(&split_lines(&text), rules),
            units_found: units.len(),
            ..FileOutcome::default()
        };
        if outcome.aggregated {
            debug!(file = %path.display(), units = units.len(), "segmented aggregated sample");
        }

        for unit in units {
            if !unit.target.is_contained() {
                warn!(
                    file = %path.display(),
                    reference = %unit.spec_reference,
                    "spec reference does not map to a usable output path"
                );
                outcome.skipped += 1;
                continue;
            }

            let candidate = Candidate {
                dialect: self.dialect,
                stem: &unit.target.stem,
                content: &unit.code,
            };
            let verdict = self.oracle.validate(candidate).await?;
            match verdict {
                Verdict::Accept => outcome.artifacts.push(ExampleArtifact {
                    content: self.emitter.emit(&unit.code),
                    target_dir: unit.target.dir,
                    target_stem: unit.target.stem,
                    spec_reference: unit.spec_reference,
                    source_file: path.to_path_buf(),
                    unit_index: unit.unit_index,
                }),
                Verdict::Reject { diagnostics } => {
                    warn!(
                        file = %path.display(),
                        reference = %unit.spec_reference,
                        diagnostics = %diagnostics.trim_end(),
                        "unit rejected by validation"
                    );
                    outcome.rejected += 1;
                },
            }
        }

        Ok(outcome)
    }
}

/// Write artifacts below `output_root`, returning their relative paths in order.
pub fn write_artifacts(artifacts: &[ExampleArtifact], output_root: &Path) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let relative = artifact.relative_path();
        let path = output_root.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &artifact.content)?;
        debug!(path = %relative, "wrote artifact");
        written.push(relative);
    }
    info!(count = written.len(), root = %output_root.display(), "wrote artifacts");
    Ok(written)
}
