//! Migration framework
//!
//! Embedded SQL applied in order, each recorded with its checksum. A
//! recorded checksum that no longer matches the embedded SQL is an error.

mod checksums;
mod embedded;
mod runner;

pub use runner::apply_migrations;
