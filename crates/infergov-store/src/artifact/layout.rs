use infergov_core::codec::hash_hex;
use infergov_core::model::ArtifactKind;
use std::path::{Path, PathBuf};

/// Location of an artifact file
///
/// Shards by the first two hex chars of `sha256(id)`: ids derived from one
/// request share a prefix, so sharding on the id itself would cluster them.
pub fn artifact_path(root: &Path, kind: ArtifactKind, id: &str) -> PathBuf {
    let digest = hash_hex(id.as_bytes());
    root.join("artifacts")
        .join(kind.dir_name())
        .join(&digest[..2])
        .join(format!("{}.json", id))
}
