//! Pipeline stages that touch the store
//!
//! Each stage is a small struct borrowing the `ArtifactStore`; the
//! `Pipeline` wires them together for one submission.

pub mod binder;
pub mod emitter;
pub mod pipeline;
pub mod replay;
