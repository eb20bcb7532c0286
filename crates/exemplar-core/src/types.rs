//! Release identity and ledger record types.
//!
//! [`ReleaseInfo`] describes the SDK release being harvested; the remaining
//! types are the rows going into and coming out of the [`Ledger`](crate::Ledger),
//! including the metadata export published next to the examples.

use std::fmt;
use std::io;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Dialect, Error, Result};

/// The SDK release whose samples are being harvested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Release tag in the SDK repository.
    pub tag: String,
    /// SDK package name.
    pub package: String,
    /// SDK package version.
    pub version: String,
    /// Directory of the package inside the SDK repository, used in links.
    pub sdk_name: String,
}

impl ReleaseInfo {
    /// Build release info, deriving the SDK directory name from the package.
    pub fn new(
        dialect: Dialect,
        tag: impl Into<String>,
        package: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let package = package.into();
        let sdk_name = derive_sdk_name(dialect, &package);
        Self {
            tag: tag.into(),
            package,
            version: version.into(),
            sdk_name,
        }
    }

    /// Replace the derived SDK directory name.
    #[must_use]
    pub fn with_sdk_name(mut self, sdk_name: impl Into<String>) -> Self {
        self.sdk_name = sdk_name.into();
        self
    }
}

/// SDK directory name conventionally used for `package` in each SDK repository.
pub fn derive_sdk_name(dialect: Dialect, package: &str) -> String {
    match dialect {
        Dialect::Java => {
            if package == "azure-resourcemanager" {
                "resourcemanager".to_string()
            } else {
                package
                    .strip_prefix("azure-resourcemanager-")
                    .unwrap_or(package)
                    .to_string()
            }
        },
        Dialect::JavaScript => package
            .strip_prefix("@azure/arm-")
            .unwrap_or(package)
            .to_string(),
        Dialect::Go => package
            .rsplit('/')
            .nth(1)
            .unwrap_or(package)
            .to_string(),
    }
}

/// What happens when a release with the same `(name, language)` is recorded again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Leave the existing release untouched and report a duplicate.
    #[default]
    Reject,
    /// Delete the existing release and its files, then insert the new one.
    Replace,
}

impl DuplicatePolicy {
    /// Name used in configuration and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "replace" | "upsert" => Ok(Self::Replace),
            other => Err(Error::Parse(format!(
                "unknown duplicate policy '{other}' (expected reject or replace)"
            ))),
        }
    }
}

/// A release to be recorded in the ledger together with its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    /// Ledger name, unique together with `language`.
    pub name: String,
    /// Dialect short name (`go`, `js`, `java`).
    pub language: String,
    /// Release tag in the SDK repository.
    pub tag: String,
    /// SDK package name.
    pub package: String,
    /// SDK package version.
    pub version: String,
    /// Publication time, stored as Unix epoch seconds.
    pub published_at: DateTime<Utc>,
    /// Output paths relative to the output root, `/`-separated.
    pub files: Vec<String>,
}

/// Summary row of a recorded release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Row id.
    pub id: i64,
    /// Ledger name.
    pub name: String,
    /// Dialect short name.
    pub language: String,
    /// Release tag in the SDK repository.
    pub tag: String,
    /// SDK package name.
    pub package: String,
    /// SDK package version.
    pub version: String,
    /// Publication time.
    pub published_at: DateTime<Utc>,
}

/// Result of [`Ledger::record_release`](crate::Ledger::record_release).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    /// The release was new and has been inserted.
    Written,
    /// The release was already recorded; nothing changed.
    Duplicate,
    /// An earlier record of the release was deleted and replaced.
    Replaced,
}

impl RecordOutcome {
    /// Lowercase name, as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Duplicate => "duplicate",
            Self::Replaced => "replaced",
        }
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release row as published in a metadata export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedRelease {
    /// Row id, referenced by [`ExportedFile::release_id`].
    pub id: i64,
    /// Ledger name.
    pub name: String,
    /// Dialect short name.
    pub language: String,
    /// Release tag in the SDK repository.
    pub tag: String,
    /// SDK package name.
    pub package: String,
    /// SDK package version.
    pub version: String,
    /// Publication time as Unix epoch seconds.
    pub date_epoch: i64,
    /// Publication day as `MM/DD/YYYY`, UTC.
    pub date: String,
}

/// File row as published in a metadata export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    /// Row id.
    pub id: i64,
    /// Output path relative to the output root.
    pub file: String,
    /// Owning release.
    pub release_id: i64,
}

/// Snapshot of the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerExport {
    /// Releases ordered by id.
    pub releases: Vec<ExportedRelease>,
    /// Files ordered by id.
    pub files: Vec<ExportedFile>,
}

/// Header row of the release index CSV.
pub const RELEASE_INDEX_HEADER: [&str; 8] = [
    "id",
    "name",
    "language",
    "tag",
    "package",
    "version",
    "date_epoch",
    "date",
];

/// Header row of the file list CSV.
pub const FILE_LIST_HEADER: [&str; 3] = ["id", "file", "release_id"];

impl LedgerExport {
    /// Write the releases as CSV, header row first.
    pub fn write_release_index<W: io::Write>(&self, writer: W) -> Result<()> {
        write_csv(writer, &RELEASE_INDEX_HEADER, &self.releases)
    }

    /// Write the files as CSV, header row first.
    pub fn write_file_list<W: io::Write>(&self, writer: W) -> Result<()> {
        write_csv(writer, &FILE_LIST_HEADER, &self.files)
    }
}

/// The header is written even when there are no rows.
fn write_csv<W: io::Write, T: Serialize>(writer: W, header: &[&str], rows: &[T]) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    out.write_record(header)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}
