//! Store-specific constructors for `GovError`

use infergov_core::errors::{GovError, GovErrorKind};

pub use infergov_core::errors::Result;

pub fn migration_error(migration_id: &str, reason: &str) -> GovError {
    GovError::new(GovErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// An applied migration no longer matches the embedded SQL
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> GovError {
    GovError::new(GovErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

pub fn from_rusqlite(err: rusqlite::Error) -> GovError {
    GovError::new(GovErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

pub fn io_error(operation: &str, err: std::io::Error) -> GovError {
    GovError::new(GovErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// A registry row that cannot be mapped back into an entry
pub fn registry_corrupt(reason: impl Into<String>) -> GovError {
    GovError::new(GovErrorKind::Persistence)
        .with_op("registry_read")
        .with_message(reason)
}

pub fn lock_poisoned(what: &str) -> GovError {
    GovError::new(GovErrorKind::Internal)
        .with_op("lock")
        .with_message(format!("{} lock poisoned", what))
}
