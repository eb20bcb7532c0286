//! Release ledger backed by SQLite.
//!
//! The ledger remembers which releases have been published and which output
//! files each of them produced. A release is identified by `(name, language)`
//! and is the unit of idempotency: recording it twice either reports a
//! duplicate or replaces the earlier rows, depending on [`DuplicatePolicy`].
//!
//! Writers are serialized per ledger file with an exclusive lock on a sibling
//! `.lock` file plus an immediate transaction, so two concurrent harvest runs
//! can never interleave their inserts. Every mutating call is one transaction;
//! on any error the transaction is rolled back and the prior state remains.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info, warn};

use crate::types::{
    DuplicatePolicy, ExportedFile, ExportedRelease, LedgerExport, NewRelease, RecordOutcome,
    Release,
};
use crate::{Error, Result};

const SCHEMA: &str = "
create table if not exists release (
    id          integer         not null primary key,
    name        varchar(255)    not null,
    language    varchar(255)    not null,
    tag         varchar(255)    not null,
    package     varchar(255)    not null,
    version     varchar(255)    not null,
    date_epoch  integer         not null default 0,
    unique (name, language)
);
create index if not exists release_idx1 on release (language, package, version);
create table if not exists file (
    id          integer         not null primary key,
    file        varchar(1024)   not null unique,
    release_id  integer         not null,
    foreign key (release_id) references release (id) on delete cascade
);
create index if not exists file_idx1 on file (release_id);
";

const EXPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// How long a statement waits on a database locked by another connection.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to one ledger database.
pub struct Ledger {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Ledger {
    /// Open (creating if needed) the ledger at `path` and ensure its schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!(
                    "failed to create ledger directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let ledger = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        ledger.init()?;
        debug!(path = %path.display(), "opened ledger");
        Ok(ledger)
    }

    /// An in-memory ledger, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let ledger = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        ledger.init()?;
        Ok(ledger)
    }

    /// Create the schema if it does not exist yet. Safe to call repeatedly.
    pub fn init(&self) -> Result<()> {
        let _lock = self.write_lock()?;
        self.conn.pragma_update(None, "foreign_keys", 1)?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Database file, `None` for in-memory ledgers.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Exclusive writer lock held for the duration of one mutation.
    fn write_lock(&self) -> Result<Option<File>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                Error::Storage(format!("failed to open lock {}: {e}", lock_path.display()))
            })?;
        lock.lock_exclusive().map_err(|e| {
            Error::Storage(format!("failed to lock {}: {e}", lock_path.display()))
        })?;
        Ok(Some(lock))
    }

    /// Whether a release with this name and language is already recorded.
    pub fn query_existing(&self, name: &str, language: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "select 1 from release where name = ?1 and language = ?2",
                params![name, language],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Record a release and its files atomically.
    ///
    /// Under [`DuplicatePolicy::Reject`] an existing `(name, language)` yields
    /// [`RecordOutcome::Duplicate`] and nothing is written. Under
    /// [`DuplicatePolicy::Replace`] the existing release and its files are
    /// deleted before the new rows are inserted. A file path owned by another
    /// release fails with [`Error::Conflict`].
    pub fn record_release(
        &mut self,
        release: &NewRelease,
        policy: DuplicatePolicy,
    ) -> Result<RecordOutcome> {
        let _lock = self.write_lock()?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<i64> = tx
            .query_row(
                "select id from release where name = ?1 and language = ?2",
                params![release.name, release.language],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match (existing, policy) {
            (Some(_), DuplicatePolicy::Reject) => {
                warn!(
                    name = %release.name,
                    language = %release.language,
                    "release already recorded"
                );
                return Ok(RecordOutcome::Duplicate);
            },
            (Some(id), DuplicatePolicy::Replace) => {
                tx.execute("delete from release where id = ?1", params![id])?;
                RecordOutcome::Replaced
            },
            (None, _) => RecordOutcome::Written,
        };

        tx.execute(
            "insert into release (name, language, tag, package, version, date_epoch) \
             values (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                release.name,
                release.language,
                release.tag,
                release.package,
                release.version,
                release.published_at.timestamp(),
            ],
        )?;
        let release_id = tx.last_insert_rowid();

        {
            let mut owner = tx.prepare(
                "select release.name, release.language from file \
                 join release on file.release_id = release.id where file.file = ?1",
            )?;
            let mut insert = tx.prepare("insert into file (file, release_id) values (?1, ?2)")?;
            let mut seen = std::collections::HashSet::new();
            for file in &release.files {
                if !seen.insert(file.as_str()) {
                    continue;
                }
                let conflict: Option<(String, String)> = owner
                    .query_row(params![file], |row| Ok((row.get(0)?, row.get(1)?)))
                    .optional()?;
                if let Some((other_name, other_language)) = conflict {
                    return Err(Error::Conflict(format!(
                        "{file} is already recorded for {other_language}#{other_name}"
                    )));
                }
                insert.execute(params![file, release_id])?;
            }
        }

        tx.commit()?;
        info!(
            name = %release.name,
            language = %release.language,
            files = release.files.len(),
            outcome = %outcome,
            "recorded release"
        );
        Ok(outcome)
    }

    /// Recorded releases, optionally restricted to one language.
    ///
    /// Ordered by language, package, version and name.
    pub fn list_releases(&self, language: Option<&str>) -> Result<Vec<Release>> {
        let mut stmt = self.conn.prepare(
            "select id, name, language, tag, package, version, date_epoch from release \
             where ?1 is null or language = ?1 \
             order by language, package, version, name",
        )?;
        let rows = stmt.query_map(params![language], |row| {
            Ok(Release {
                id: row.get(0)?,
                name: row.get(1)?,
                language: row.get(2)?,
                tag: row.get(3)?,
                package: row.get(4)?,
                version: row.get(5)?,
                published_at: from_epoch(row.get(6)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// File paths recorded for one release, in path order.
    pub fn files_for_release(&self, name: &str, language: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "select file.file from file join release on file.release_id = release.id \
             where release.name = ?1 and release.language = ?2 order by file.file",
        )?;
        let rows = stmt.query_map(params![name, language], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    /// Delete a release; its files go with it. Returns whether a row existed.
    pub fn remove_release(&mut self, name: &str, language: &str) -> Result<bool> {
        let _lock = self.write_lock()?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "delete from release where name = ?1 and language = ?2",
            params![name, language],
        )?;
        tx.commit()?;
        if removed > 0 {
            info!(name, language, "removed release");
        }
        Ok(removed > 0)
    }

    /// Snapshot of releases and files for metadata publication.
    pub fn export(&self, language: Option<&str>) -> Result<LedgerExport> {
        let mut stmt = self.conn.prepare(
            "select id, name, language, tag, package, version, date_epoch from release \
             where ?1 is null or language = ?1 order by id",
        )?;
        let releases = stmt
            .query_map(params![language], |row| {
                let date_epoch: i64 = row.get(6)?;
                Ok(ExportedRelease {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    language: row.get(2)?,
                    tag: row.get(3)?,
                    package: row.get(4)?,
                    version: row.get(5)?,
                    date: from_epoch(date_epoch).format(EXPORT_DATE_FORMAT).to_string(),
                    date_epoch,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "select file.id, file.file, file.release_id from file \
             join release on file.release_id = release.id \
             where ?1 is null or release.language = ?1 order by file.id",
        )?;
        let files = stmt
            .query_map(params![language], |row| {
                Ok(ExportedFile {
                    id: row.get(0)?,
                    file: row.get(1)?,
                    release_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(LedgerExport { releases, files })
    }
}

fn from_epoch(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}
