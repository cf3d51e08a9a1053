//! Policy Gate
//!
//! A candidate request is checked against an immutable, versioned
//! [`PolicyMatrix`] before anything is hashed or written. The outcome is a
//! [`Verdict`]; rejection is an ordinary value, not an error.

pub mod gate;
pub mod matrix;
pub mod verdict;

pub use gate::{PolicyGate, CANDIDATE_FIELDS};
pub use matrix::{PolicyMatrix, ProviderPolicy};
pub use verdict::{RejectReason, Rejection, Verdict};
