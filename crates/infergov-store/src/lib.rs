//! infergov store - persistence for governed inference artifacts
//!
//! Provides:
//! - Artifact Store: one canonical JSON file per artifact, written
//!   temp→rename and published only inside a registry transaction
//! - Artifact Registry: append-only SQLite log of every write
//! - Embedded migrations with checksums

pub mod artifact;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod registry;

pub use artifact::{ArtifactStore, StoredArtifact, WriteMeta, WriteOutcome};
pub use errors::Result;
pub use registry::{AppendOutcome, Registry};
