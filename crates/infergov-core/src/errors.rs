use crate::codec::EncodingError;
use crate::model::{ArtifactKind, ErrorType};

/// Result type alias using GovError
pub type Result<T> = std::result::Result<T, GovError>;

// ========== Error Facility ==========

/// Classification of every failure a pipeline API can return
///
/// Expected rejections (policy, snapshot binding, provider failures) are
/// not errors; they travel as `Verdict::Reject` or as error artifacts.
/// The kinds below cover integrity violations and operational faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovErrorKind {
    // Integrity
    SchemaInvalid,
    LinkageInvalid,
    ArtifactConflict,

    // Codec
    Encoding,

    // Storage
    NotFound,
    Io,
    Persistence,

    // Configuration
    InvalidConfig,

    // Internal
    Internal,
}

impl GovErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            GovErrorKind::SchemaInvalid => "ERR_SCHEMA_INVALID",
            GovErrorKind::LinkageInvalid => "ERR_LINKAGE_INVALID",
            GovErrorKind::ArtifactConflict => "ERR_ARTIFACT_CONFLICT",
            GovErrorKind::Encoding => "ERR_ENCODING",
            GovErrorKind::NotFound => "ERR_NOT_FOUND",
            GovErrorKind::Io => "ERR_IO",
            GovErrorKind::Persistence => "ERR_PERSISTENCE",
            GovErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            GovErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Taxonomy entry used when this failure has to be recorded in an error artifact
    pub fn error_type(&self) -> ErrorType {
        match self {
            GovErrorKind::SchemaInvalid => ErrorType::SchemaInvalid,
            GovErrorKind::LinkageInvalid => ErrorType::LinkageInvalid,
            GovErrorKind::ArtifactConflict => ErrorType::ArtifactConflict,
            GovErrorKind::Encoding => ErrorType::OutputCanonicalizationFailed,
            GovErrorKind::NotFound
            | GovErrorKind::Io
            | GovErrorKind::Persistence
            | GovErrorKind::InvalidConfig
            | GovErrorKind::Internal => ErrorType::InternalError,
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind for programmatic handling plus optional context for
/// operators. Messages never contain prompt text or provider payloads.
#[derive(Debug, Clone)]
pub struct GovError {
    kind: GovErrorKind,
    op: Option<String>,
    artifact_kind: Option<ArtifactKind>,
    artifact_id: Option<String>,
    message: String,
}

impl GovError {
    /// Create a new error with the specified kind
    pub fn new(kind: GovErrorKind) -> Self {
        Self {
            kind,
            op: None,
            artifact_kind: None,
            artifact_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the artifact this error is about
    pub fn with_artifact(mut self, kind: ArtifactKind, id: impl Into<String>) -> Self {
        self.artifact_kind = Some(kind);
        self.artifact_id = Some(id.into());
        self
    }

    /// Add an artifact id without a kind (e.g. while validating ids)
    pub fn with_artifact_id(mut self, id: impl Into<String>) -> Self {
        self.artifact_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> GovErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn error_type(&self) -> ErrorType {
        self.kind.error_type()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn artifact_kind(&self) -> Option<ArtifactKind> {
        self.artifact_kind
    }

    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is(&self, kind: GovErrorKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for GovError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        match (&self.artifact_kind, &self.artifact_id) {
            (Some(kind), Some(id)) => write!(f, " ({} {})", kind.registry_label(), id)?,
            (None, Some(id)) => write!(f, " (artifact_id: {})", id)?,
            _ => {}
        }
        Ok(())
    }
}

impl std::error::Error for GovError {}

impl From<EncodingError> for GovError {
    fn from(err: EncodingError) -> Self {
        GovError::new(GovErrorKind::Encoding)
            .with_op("canonicalize")
            .with_message(err.to_string())
    }
}

// ========== Constructors shared across crates ==========

/// Same id and kind already stored with a different canonical hash
pub fn artifact_conflict(kind: ArtifactKind, id: &str, stored: &str, offered: &str) -> GovError {
    GovError::new(GovErrorKind::ArtifactConflict)
        .with_op("artifact_write")
        .with_artifact(kind, id)
        .with_message(format!(
            "stored hash {} differs from offered hash {}",
            stored, offered
        ))
}

/// Artifact is not present in the store
pub fn artifact_not_found(kind: ArtifactKind, id: &str) -> GovError {
    GovError::new(GovErrorKind::NotFound)
        .with_op("artifact_read")
        .with_artifact(kind, id)
        .with_message("artifact not found")
}

/// A result or receipt does not line up with the artifacts it claims to link
pub fn linkage_invalid(op: &str, message: impl Into<String>) -> GovError {
    GovError::new(GovErrorKind::LinkageInvalid)
        .with_op(op.to_string())
        .with_message(message)
}
