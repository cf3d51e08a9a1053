//! infergov engine - orchestration of the governed inference pipeline
//!
//! Policy Gate → Snapshot Binding Validator → provider invocation →
//! Result Emitter → Receipt Binder, with every write going through the
//! Artifact Store. The Replay Verifier runs separately and never writes.

pub mod commands;
pub mod config;

pub use commands::binder::ReceiptBinder;
pub use commands::emitter::{Emitted, ResultEmitter};
pub use commands::pipeline::{Pipeline, Submission};
pub use commands::replay::{ArtifactRef, MismatchDetail, ReplayReport, ReplayVerdict, ReplayVerifier};
pub use config::PipelineConfig;
