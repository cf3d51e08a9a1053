use infergov_core::codec::{self, hash_hex};
use infergov_core::errors::{artifact_conflict, artifact_not_found};
use infergov_core::model::{validate_artifact_id, ArtifactKind, NewRegistryEntry, RegistryEntry};
use infergov_core::{log_op_end, log_op_error, log_op_start};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::atomic::StagedFile;
use super::layout::artifact_path;
use crate::errors::{io_error, Result};
use crate::registry::{AppendOutcome, Registry};

pub const REGISTRY_FILE: &str = "registry.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    AlreadyExists,
}

impl WriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOutcome::Created => "created",
            WriteOutcome::AlreadyExists => "already_exists",
        }
    }
}

/// What the store holds for an id after a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub kind: ArtifactKind,
    pub artifact_id: String,
    pub sha256: String,
    pub byte_size: u64,
    pub seq: i64,
    pub outcome: WriteOutcome,
}

/// Registry metadata supplied with a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteMeta {
    pub created_at_utc: Option<String>,
    pub parent_artifact_ids: Vec<String>,
    /// An id whose presence in the registry forbids this write
    pub exclusive_with: Option<(ArtifactKind, String)>,
}

impl WriteMeta {
    pub fn new(created_at_utc: Option<String>, parent_artifact_ids: Vec<String>) -> Self {
        Self {
            created_at_utc,
            parent_artifact_ids,
            exclusive_with: None,
        }
    }

    /// Refuse the write if `(kind, id)` is registered by the time it commits
    pub fn exclusive_with(mut self, kind: ArtifactKind, id: impl Into<String>) -> Self {
        self.exclusive_with = Some((kind, id.into()));
        self
    }
}

/// Append-only artifact store backed by the filesystem and the registry
///
/// Owns the artifact bytes. Nothing else writes under `root/artifacts`.
pub struct ArtifactStore {
    root: PathBuf,
    registry: Registry,
}

impl ArtifactStore {
    /// Open (or create) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| io_error("create_store_root", e))?;
        let registry = Registry::open(root.join(REGISTRY_FILE))?;
        Ok(Self { root, registry })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn path_of(&self, kind: ArtifactKind, id: &str) -> PathBuf {
        artifact_path(&self.root, kind, id)
    }

    /// Write canonical bytes under (kind, id)
    ///
    /// Idempotent for identical bytes. A different hash under an existing
    /// id fails with `ArtifactConflict` and changes nothing, as does a
    /// registered `meta.exclusive_with` sibling. Exactly one registry entry
    /// is appended per created artifact.
    pub fn write(
        &self,
        kind: ArtifactKind,
        id: &str,
        bytes: &[u8],
        meta: &WriteMeta,
    ) -> Result<StoredArtifact> {
        log_op_start!("artifact_write", artifact_kind = kind.registry_label(), artifact_id = id);
        let start = std::time::Instant::now();

        let stored = self.write_impl(kind, id, bytes, meta).map_err(|e| {
            log_op_error!(
                "artifact_write",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                artifact_id = id
            );
            e
        })?;

        log_op_end!(
            "artifact_write",
            duration_ms = start.elapsed().as_millis() as u64,
            artifact_id = id,
            write_outcome = stored.outcome.as_str()
        );
        Ok(stored)
    }

    /// Canonicalize `record` and write it
    pub fn write_record<T: Serialize>(
        &self,
        kind: ArtifactKind,
        id: &str,
        record: &T,
        meta: &WriteMeta,
    ) -> Result<StoredArtifact> {
        let bytes = codec::canonicalize(record)?;
        self.write(kind, id, &bytes, meta)
    }

    fn write_impl(
        &self,
        kind: ArtifactKind,
        id: &str,
        bytes: &[u8],
        meta: &WriteMeta,
    ) -> Result<StoredArtifact> {
        validate_artifact_id(id)?;
        let sha256 = hash_hex(bytes);

        // common case: already registered, no need to stage anything
        if let Some(existing) = self.registry.find(kind, id)? {
            return settle_existing(kind, id, &sha256, existing);
        }

        let target = artifact_path(&self.root, kind, id);
        let mut staged = StagedFile::stage(&target, bytes)?;
        let entry = NewRegistryEntry {
            kind,
            artifact_id: id.to_string(),
            sha256: sha256.clone(),
            byte_size: bytes.len() as u64,
            created_at_utc: meta.created_at_utc.clone(),
            parent_artifact_ids: meta.parent_artifact_ids.clone(),
        };

        let mut published = false;
        let exclusive_with = meta
            .exclusive_with
            .as_ref()
            .map(|(kind, id)| (*kind, id.as_str()));
        let outcome = self.registry.append_exclusive(entry, exclusive_with, || {
            staged.publish()?;
            published = true;
            Ok(())
        });

        match outcome {
            Ok(AppendOutcome::Appended(entry)) => Ok(StoredArtifact {
                kind,
                artifact_id: entry.artifact_id,
                sha256: entry.sha256,
                byte_size: entry.byte_size,
                seq: entry.seq,
                outcome: WriteOutcome::Created,
            }),
            Ok(AppendOutcome::Existing(existing)) => settle_existing(kind, id, &sha256, existing),
            Err(e) => {
                // published but not committed: take the file back out
                if published {
                    let _ = fs::remove_file(&target);
                }
                Err(e)
            }
        }
    }

    /// Bytes of a registered artifact
    ///
    /// Unregistered ids are `NotFound` even if a stray file exists.
    pub fn read(&self, kind: ArtifactKind, id: &str) -> Result<Vec<u8>> {
        if self.registry.find(kind, id)?.is_none() {
            return Err(artifact_not_found(kind, id));
        }
        match fs::read(artifact_path(&self.root, kind, id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(artifact_not_found(kind, id)
                .with_message("registered artifact file is missing")),
            Err(e) => Err(io_error("read_artifact", e)),
        }
    }

    pub fn read_record<T: DeserializeOwned>(&self, kind: ArtifactKind, id: &str) -> Result<T> {
        let bytes = self.read(kind, id)?;
        codec::decode(&bytes).map_err(|e| {
            infergov_core::GovError::from(e)
                .with_op("artifact_decode")
                .with_artifact(kind, id)
        })
    }

    pub fn exists(&self, kind: ArtifactKind, id: &str) -> Result<bool> {
        Ok(self.registry.find(kind, id)?.is_some())
    }

    pub fn entry(&self, kind: ArtifactKind, id: &str) -> Result<Option<RegistryEntry>> {
        self.registry.find(kind, id)
    }
}

fn settle_existing(
    kind: ArtifactKind,
    id: &str,
    sha256: &str,
    existing: RegistryEntry,
) -> Result<StoredArtifact> {
    if existing.sha256 != sha256 {
        return Err(artifact_conflict(kind, id, &existing.sha256, sha256));
    }
    Ok(StoredArtifact {
        kind,
        artifact_id: existing.artifact_id,
        sha256: existing.sha256,
        byte_size: existing.byte_size,
        seq: existing.seq,
        outcome: WriteOutcome::AlreadyExists,
    })
}
