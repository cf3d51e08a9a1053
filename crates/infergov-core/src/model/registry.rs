use serde::{Deserialize, Serialize};

use super::{kind::registry_label, ArtifactKind};

/// One row of the append-only registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Monotonic write order, assigned by the registry
    pub seq: i64,
    #[serde(with = "registry_label")]
    pub kind: ArtifactKind,
    pub artifact_id: String,
    /// SHA-256 of the stored bytes
    pub sha256: String,
    pub byte_size: u64,
    pub created_at_utc: Option<String>,
    pub parent_artifact_ids: Vec<String>,
}

/// A registry row before `seq` is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistryEntry {
    pub kind: ArtifactKind,
    pub artifact_id: String,
    pub sha256: String,
    pub byte_size: u64,
    pub created_at_utc: Option<String>,
    pub parent_artifact_ids: Vec<String>,
}

impl NewRegistryEntry {
    pub fn into_entry(self, seq: i64) -> RegistryEntry {
        RegistryEntry {
            seq,
            kind: self.kind,
            artifact_id: self.artifact_id,
            sha256: self.sha256,
            byte_size: self.byte_size,
            created_at_utc: self.created_at_utc,
            parent_artifact_ids: self.parent_artifact_ids,
        }
    }
}
