//! Core types shared across infergov facilities
//!
//! This crate provides foundational types used by the error, logging and
//! provider-boundary facilities:
//!
//! - **Correlation types**: TraceId, SpanId, RequestContext
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, SpanId, TraceId};
pub use sensitive::Sensitive;
