use crate::model::ErrorType;

/// Outcome of a gate or validator
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<T> {
    Accept(T),
    Reject(Rejection),
}

impl<T> Verdict<T> {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accept(_) => None,
            Verdict::Reject(r) => Some(r),
        }
    }

    pub fn into_result(self) -> Result<T, Rejection> {
        match self {
            Verdict::Accept(v) => Ok(v),
            Verdict::Reject(r) => Err(r),
        }
    }
}

/// Fine-grained cause of a rejection
///
/// Together with the [`ErrorType`] this forms the stable reason string
/// recorded in error artifacts and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    // envelope
    NotAnObject,
    UnknownField,
    MissingField,
    WrongType,
    InvalidTimestamp,
    InvalidSnapshotHash,
    InvalidArtifactId,
    DuplicateInputArtifact,
    EmptyUserInput,
    SnapshotMissing,

    // policy
    UnknownProvider,
    ProviderNotConfigured,
    ModelAliasForbidden,
    ModelNotAllowlisted,
    TemperatureOutOfRange,
    MaxOutputTokensOutOfRange,
    SystemPromptRequired,
    ForbiddenField,

    // snapshot binding
    SnapshotArtifactMissing,
    SnapshotMismatch,
    WorkOrderMissing,
    WorkOrderMismatch,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotAnObject => "not_an_object",
            RejectReason::UnknownField => "unknown_field",
            RejectReason::MissingField => "missing_field",
            RejectReason::WrongType => "wrong_type",
            RejectReason::InvalidTimestamp => "invalid_timestamp",
            RejectReason::InvalidSnapshotHash => "invalid_snapshot_hash",
            RejectReason::InvalidArtifactId => "invalid_artifact_id",
            RejectReason::DuplicateInputArtifact => "duplicate_input_artifact",
            RejectReason::EmptyUserInput => "empty_user_input",
            RejectReason::SnapshotMissing => "snapshot_missing",
            RejectReason::UnknownProvider => "unknown_provider",
            RejectReason::ProviderNotConfigured => "provider_not_configured",
            RejectReason::ModelAliasForbidden => "model_alias_forbidden",
            RejectReason::ModelNotAllowlisted => "model_not_allowlisted",
            RejectReason::TemperatureOutOfRange => "temperature_out_of_range",
            RejectReason::MaxOutputTokensOutOfRange => "max_output_tokens_out_of_range",
            RejectReason::SystemPromptRequired => "system_prompt_required",
            RejectReason::ForbiddenField => "forbidden_field",
            RejectReason::SnapshotArtifactMissing => "snapshot_artifact_missing",
            RejectReason::SnapshotMismatch => "snapshot_mismatch",
            RejectReason::WorkOrderMissing => "work_order_missing",
            RejectReason::WorkOrderMismatch => "work_order_mismatch",
        }
    }
}

/// Why a candidate or request was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub error_type: ErrorType,
    pub reason: RejectReason,
    /// Offending candidate field, when there is one
    pub field: Option<String>,
}

impl Rejection {
    pub fn new(error_type: ErrorType, reason: RejectReason) -> Self {
        Self {
            error_type,
            reason,
            field: None,
        }
    }

    pub fn schema(reason: RejectReason, field: &str) -> Self {
        Self::new(ErrorType::SchemaInvalid, reason).on_field(field)
    }

    pub fn policy(reason: RejectReason, field: &str) -> Self {
        Self::new(ErrorType::PolicyViolation, reason).on_field(field)
    }

    pub fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    /// `error_type:reason`, or just `error_type` when both read the same
    ///
    /// ```
    /// use infergov_core::policy::{RejectReason, Rejection};
    /// use infergov_core::ErrorType;
    ///
    /// let r = Rejection::policy(RejectReason::ModelAliasForbidden, "model");
    /// assert_eq!(r.reason_string(), "policy_violation:model_alias_forbidden");
    ///
    /// let r = Rejection::new(ErrorType::SnapshotMismatch, RejectReason::SnapshotMismatch);
    /// assert_eq!(r.reason_string(), "snapshot_mismatch");
    /// ```
    pub fn reason_string(&self) -> String {
        if self.error_type.as_str() == self.reason.as_str() {
            self.error_type.as_str().to_string()
        } else {
            format!("{}:{}", self.error_type.as_str(), self.reason.as_str())
        }
    }

    /// Operator-facing description; never echoes candidate values
    pub fn describe(&self) -> String {
        match &self.field {
            Some(field) => format!("{} (field '{}')", self.reason_string(), field),
            None => self.reason_string(),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}
