//! infergov core - governed inference integrity kernel
//!
//! This crate holds the pure, side-effect free parts of the pipeline:
//! - Canonical codec (sorted-key JSON + SHA-256)
//! - Artifact data model (request, response, error, receipt, registry entry)
//! - Policy Gate over an immutable, versioned policy matrix
//! - Snapshot Binding Validator and its resolver collaborators
//! - Provider invoker boundary types
//! - Error and logging facilities shared by the store and engine crates
//!
//! Nothing in here touches the filesystem or reads a clock.

pub mod binding;
pub mod codec;
pub mod errors;
pub mod invoker;
pub mod logging_facility;
pub mod model;
pub mod policy;
pub mod scrub;

pub use binding::{
    SnapshotBinding, SnapshotBindingValidator, SnapshotResolver, StaticSnapshotResolver,
    StaticWorkOrderResolver, WorkOrderResolver,
};
pub use errors::{GovError, GovErrorKind, Result};
pub use invoker::{
    ProviderCall, ProviderFailure, ProviderFailureKind, ProviderInvoker, ProviderOutput,
};
pub use model::{
    ArtifactKind, ErrorArtifact, ErrorType, InferenceRequest, NewRegistryEntry, Provider, Receipt,
    ReceiptStatus, RegistryEntry, RequestBody, ResponseArtifact, ResultArtifact, TokenUsage,
};
pub use policy::{PolicyGate, PolicyMatrix, Rejection, Verdict};
