//! Artifact Registry
//!
//! Append-only SQLite log with one row per artifact write. `UNIQUE(kind,
//! artifact_id)` picks the single winner among concurrent writers of the
//! same id; triggers refuse UPDATE and DELETE.
//!
//! One `Mutex<Connection>` per handle serialises the publish-and-insert
//! step of every append, distinct ids included. Staging and hashing happen
//! before the lock is taken, so only the rename and the INSERT queue up.

use infergov_core::errors::{GovError, GovErrorKind};
use infergov_core::model::{ArtifactKind, NewRegistryEntry, RegistryEntry};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::Mutex;

use crate::db;
use crate::errors::{from_rusqlite, lock_poisoned, registry_corrupt, Result};
use crate::migrations::apply_migrations;

const SELECT_COLUMNS: &str =
    "seq, kind, artifact_id, sha256, byte_size, created_at_utc, parent_artifact_ids";

/// Result of an append attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// New row written; the publish callback ran and succeeded
    Appended(RegistryEntry),
    /// A row for this kind and id already existed; nothing was written
    Existing(RegistryEntry),
}

impl AppendOutcome {
    pub fn entry(&self) -> &RegistryEntry {
        match self {
            AppendOutcome::Appended(e) | AppendOutcome::Existing(e) => e,
        }
    }
}

pub struct Registry {
    conn: Mutex<Connection>,
}

impl Registry {
    /// Open (or create) the registry database and apply migrations
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append `entry` unless its (kind, id) is already registered
    ///
    /// `publish` runs inside the write transaction after the row is
    /// inserted and before commit. If it fails, the transaction rolls back
    /// and the registry is unchanged. The transaction is `IMMEDIATE`, so a
    /// second connection on the same database waits instead of racing.
    pub fn append_with<F>(&self, entry: NewRegistryEntry, publish: F) -> Result<AppendOutcome>
    where
        F: FnOnce() -> Result<()>,
    {
        self.append_exclusive(entry, None, publish)
    }

    /// Like [`Registry::append_with`], but refuses the append when
    /// `exclusive_with` is already registered
    ///
    /// The sibling lookup runs inside the same `IMMEDIATE` transaction as
    /// the INSERT, so of two mutually exclusive ids at most one is ever
    /// committed. An existing row for `entry` itself still wins over the
    /// sibling check and is reported as `Existing`.
    pub fn append_exclusive<F>(
        &self,
        entry: NewRegistryEntry,
        exclusive_with: Option<(ArtifactKind, &str)>,
        publish: F,
    ) -> Result<AppendOutcome>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut conn = self.conn.lock().map_err(|_| lock_poisoned("registry"))?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        if let Some(existing) = find_in(&tx, entry.kind, &entry.artifact_id)? {
            return Ok(AppendOutcome::Existing(existing));
        }
        if let Some((sibling_kind, sibling_id)) = exclusive_with {
            if find_in(&tx, sibling_kind, sibling_id)?.is_some() {
                return Err(GovError::new(GovErrorKind::ArtifactConflict)
                    .with_op("registry_append")
                    .with_artifact(sibling_kind, sibling_id)
                    .with_message(format!(
                        "{} {} excluded by existing {}",
                        entry.kind.registry_label(),
                        entry.artifact_id,
                        sibling_id
                    )));
            }
        }

        let parents = serde_json::to_string(&entry.parent_artifact_ids)
            .map_err(|e| registry_corrupt(e.to_string()))?;
        let byte_size = i64::try_from(entry.byte_size)
            .map_err(|_| registry_corrupt("byte_size exceeds i64"))?;
        tx.execute(
            "INSERT INTO registry_entries
                (kind, artifact_id, sha256, byte_size, created_at_utc, parent_artifact_ids)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.kind.registry_label(),
                entry.artifact_id,
                entry.sha256,
                byte_size,
                entry.created_at_utc,
                parents,
            ],
        )
        .map_err(from_rusqlite)?;
        let seq = tx.last_insert_rowid();

        publish()?;

        tx.commit().map_err(from_rusqlite)?;
        Ok(AppendOutcome::Appended(entry.into_entry(seq)))
    }

    /// Every entry in write order
    pub fn list(&self) -> Result<Vec<RegistryEntry>> {
        self.query(
            &format!("SELECT {} FROM registry_entries ORDER BY seq", SELECT_COLUMNS),
            [],
        )
    }

    /// Entries with `seq > after`, at most `limit` of them
    ///
    /// Lets a reader resume a listing where it stopped.
    pub fn list_after(&self, after: i64, limit: usize) -> Result<Vec<RegistryEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query(
            &format!(
                "SELECT {} FROM registry_entries WHERE seq > ?1 ORDER BY seq LIMIT ?2",
                SELECT_COLUMNS
            ),
            params![after, limit],
        )
    }

    pub fn find(&self, kind: ArtifactKind, artifact_id: &str) -> Result<Option<RegistryEntry>> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned("registry"))?;
        find_in(&conn, kind, artifact_id)
    }

    /// Entries that list `parent_id` among their parents
    pub fn children_of(&self, parent_id: &str) -> Result<Vec<RegistryEntry>> {
        self.query(
            &format!(
                "SELECT {} FROM registry_entries
                 WHERE EXISTS (
                    SELECT 1 FROM json_each(registry_entries.parent_artifact_ids)
                    WHERE json_each.value = ?1)
                 ORDER BY seq",
                SELECT_COLUMNS
            ),
            [parent_id],
        )
    }

    /// Entries for one kind, in write order
    pub fn list_kind(&self, kind: ArtifactKind) -> Result<Vec<RegistryEntry>> {
        self.query(
            &format!(
                "SELECT {} FROM registry_entries WHERE kind = ?1 ORDER BY seq",
                SELECT_COLUMNS
            ),
            [kind.registry_label()],
        )
    }

    pub fn len(&self) -> Result<u64> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned("registry"))?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM registry_entries", [], |r| r.get(0))
            .map_err(from_rusqlite)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<RegistryEntry>> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned("registry"))?;
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params, read_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(into_entry).collect()
    }
}

type RawRow = (i64, String, String, String, i64, Option<String>, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_entry(raw: RawRow) -> Result<RegistryEntry> {
    let (seq, kind, artifact_id, sha256, byte_size, created_at_utc, parents) = raw;
    let kind = ArtifactKind::from_registry_label(&kind)
        .ok_or_else(|| registry_corrupt(format!("unknown kind '{}' at seq {}", kind, seq)))?;
    let parent_artifact_ids: Vec<String> = serde_json::from_str(&parents)
        .map_err(|e| registry_corrupt(format!("bad parent list at seq {}: {}", seq, e)))?;
    Ok(RegistryEntry {
        seq,
        kind,
        artifact_id,
        sha256,
        byte_size: u64::try_from(byte_size)
            .map_err(|_| registry_corrupt(format!("negative byte_size at seq {}", seq)))?,
        created_at_utc,
        parent_artifact_ids,
    })
}

fn find_in(conn: &Connection, kind: ArtifactKind, artifact_id: &str) -> Result<Option<RegistryEntry>> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {} FROM registry_entries WHERE kind = ?1 AND artifact_id = ?2",
                SELECT_COLUMNS
            ),
            params![kind.registry_label(), artifact_id],
            read_row,
        )
        .optional()
        .map_err(from_rusqlite)?;
    raw.map(into_entry).transpose()
}
