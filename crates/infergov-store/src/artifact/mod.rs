//! Artifact Store
//!
//! One canonical JSON file per artifact under
//! `<root>/artifacts/<kind>/<shard>/<id>.json`. Bytes are staged to a
//! unique temp file and renamed into place only inside the registry
//! transaction that records them.

mod atomic;
mod fs_store;
mod layout;

pub use fs_store::{ArtifactStore, StoredArtifact, WriteMeta, WriteOutcome};
pub use layout::artifact_path;
