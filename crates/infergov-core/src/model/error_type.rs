use serde::{Deserialize, Serialize};

/// Closed taxonomy written into error artifacts and receipt reasons
///
/// Append-only: variants may be added, never renamed or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    SchemaInvalid,
    PolicyViolation,
    SnapshotMissing,
    SnapshotArtifactMissing,
    SnapshotMismatch,
    WorkOrderMissing,
    WorkOrderMismatch,
    LinkageInvalid,
    ArtifactConflict,
    ProviderUnavailable,
    ProviderTimeout,
    ProviderRateLimited,
    ProviderAuthFailed,
    ProviderError,
    OutputCanonicalizationFailed,
    InternalError,
}

impl ErrorType {
    pub const ALL: [ErrorType; 16] = [
        ErrorType::SchemaInvalid,
        ErrorType::PolicyViolation,
        ErrorType::SnapshotMissing,
        ErrorType::SnapshotArtifactMissing,
        ErrorType::SnapshotMismatch,
        ErrorType::WorkOrderMissing,
        ErrorType::WorkOrderMismatch,
        ErrorType::LinkageInvalid,
        ErrorType::ArtifactConflict,
        ErrorType::ProviderUnavailable,
        ErrorType::ProviderTimeout,
        ErrorType::ProviderRateLimited,
        ErrorType::ProviderAuthFailed,
        ErrorType::ProviderError,
        ErrorType::OutputCanonicalizationFailed,
        ErrorType::InternalError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::SchemaInvalid => "schema_invalid",
            ErrorType::PolicyViolation => "policy_violation",
            ErrorType::SnapshotMissing => "snapshot_missing",
            ErrorType::SnapshotArtifactMissing => "snapshot_artifact_missing",
            ErrorType::SnapshotMismatch => "snapshot_mismatch",
            ErrorType::WorkOrderMissing => "work_order_missing",
            ErrorType::WorkOrderMismatch => "work_order_mismatch",
            ErrorType::LinkageInvalid => "linkage_invalid",
            ErrorType::ArtifactConflict => "artifact_conflict",
            ErrorType::ProviderUnavailable => "provider_unavailable",
            ErrorType::ProviderTimeout => "provider_timeout",
            ErrorType::ProviderRateLimited => "provider_rate_limited",
            ErrorType::ProviderAuthFailed => "provider_auth_failed",
            ErrorType::ProviderError => "provider_error",
            ErrorType::OutputCanonicalizationFailed => "output_canonicalization_failed",
            ErrorType::InternalError => "internal_error",
        }
    }

    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            ErrorType::ProviderUnavailable
                | ErrorType::ProviderTimeout
                | ErrorType::ProviderRateLimited
                | ErrorType::ProviderAuthFailed
                | ErrorType::ProviderError
        )
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
