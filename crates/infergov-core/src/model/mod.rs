//! Artifact data model
//!
//! Every record here is immutable once written. The serde shape of each
//! struct is its canonical record shape; field names are part of the hash.

pub mod error_type;
pub mod ids;
pub mod kind;
pub mod provider;
pub mod receipt;
pub mod registry;
pub mod request;
pub mod result;

pub use error_type::ErrorType;
pub use ids::{derived_id, is_valid_artifact_id, validate_artifact_id};
pub use kind::ArtifactKind;
pub use provider::Provider;
pub use receipt::{ArtifactHashes, Receipt, ReceiptBody, ReceiptStatus};
pub use registry::{NewRegistryEntry, RegistryEntry};
pub use request::{InferenceRequest, Prompts, RequestBody, RequestParams};
pub use result::{ErrorArtifact, ResponseArtifact, ResultArtifact, TokenUsage};
