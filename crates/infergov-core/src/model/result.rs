use serde::{Deserialize, Serialize};

use super::{derived_id, ArtifactKind, ErrorType, InferenceRequest, Provider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Successful provider outcome for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseArtifact {
    /// Always `ArtifactKind::Response`
    pub kind: ArtifactKind,
    pub response_id: String,
    pub created_at_utc: String,
    pub request_id: String,
    pub request_hash: String,

    // Copied verbatim from the request
    pub work_order_id: Option<String>,
    pub snapshot_hash: String,
    pub snapshot_artifact_id: String,
    pub provider: Provider,
    pub model: String,

    pub output_text: String,
    pub usage: Option<TokenUsage>,
}

impl ResponseArtifact {
    pub fn for_request(
        request: &InferenceRequest,
        output_text: String,
        usage: Option<TokenUsage>,
    ) -> Self {
        let body = &request.body;
        Self {
            kind: ArtifactKind::Response,
            response_id: derived_id(&request.request_id, ArtifactKind::Response),
            created_at_utc: body.created_at_utc.clone(),
            request_id: request.request_id.clone(),
            request_hash: request.request_hash.clone(),
            work_order_id: body.work_order_id.clone(),
            snapshot_hash: body.snapshot_hash.clone(),
            snapshot_artifact_id: body.snapshot_artifact_id.clone(),
            provider: body.provider,
            model: body.model.clone(),
            output_text,
            usage,
        }
    }
}

/// Classified failure for one request or rejected candidate
///
/// Context fields are `None` when the failure happened before they were
/// known (e.g. a candidate with no valid provider). `message` is scrubbed
/// before construction and never holds raw prompts or provider payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorArtifact {
    /// Always `ArtifactKind::Error`
    pub kind: ArtifactKind,
    pub error_id: String,
    pub created_at_utc: Option<String>,
    pub request_id: Option<String>,
    pub request_hash: Option<String>,
    pub work_order_id: Option<String>,
    pub snapshot_hash: Option<String>,
    pub snapshot_artifact_id: Option<String>,
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub error_type: ErrorType,
    /// Stable machine reason, e.g. `policy_violation:model_not_allowlisted`
    pub reason: String,
    pub message: String,
}

impl ErrorArtifact {
    pub fn for_request(
        request: &InferenceRequest,
        error_type: ErrorType,
        reason: String,
        message: String,
    ) -> Self {
        let body = &request.body;
        Self {
            kind: ArtifactKind::Error,
            error_id: derived_id(&request.request_id, ArtifactKind::Error),
            created_at_utc: Some(body.created_at_utc.clone()),
            request_id: Some(request.request_id.clone()),
            request_hash: Some(request.request_hash.clone()),
            work_order_id: body.work_order_id.clone(),
            snapshot_hash: Some(body.snapshot_hash.clone()),
            snapshot_artifact_id: Some(body.snapshot_artifact_id.clone()),
            provider: Some(body.provider),
            model: Some(body.model.clone()),
            error_type,
            reason,
            message,
        }
    }
}

/// Exactly one result exists per request
#[derive(Debug, Clone, PartialEq)]
pub enum ResultArtifact {
    Response(ResponseArtifact),
    Error(ErrorArtifact),
}

impl ResultArtifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ResultArtifact::Response(_) => ArtifactKind::Response,
            ResultArtifact::Error(_) => ArtifactKind::Error,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ResultArtifact::Response(r) => &r.response_id,
            ResultArtifact::Error(e) => &e.error_id,
        }
    }

    /// The request this result claims as its parent
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ResultArtifact::Response(r) => Some(&r.request_id),
            ResultArtifact::Error(e) => e.request_id.as_deref(),
        }
    }

    pub fn request_hash(&self) -> Option<&str> {
        match self {
            ResultArtifact::Response(r) => Some(&r.request_hash),
            ResultArtifact::Error(e) => e.request_hash.as_deref(),
        }
    }

    /// Record tag the result carries in its own `kind` field
    pub fn declared_kind(&self) -> ArtifactKind {
        match self {
            ResultArtifact::Response(r) => r.kind,
            ResultArtifact::Error(e) => e.kind,
        }
    }
}

impl From<ResponseArtifact> for ResultArtifact {
    fn from(r: ResponseArtifact) -> Self {
        ResultArtifact::Response(r)
    }
}

impl From<ErrorArtifact> for ResultArtifact {
    fn from(e: ErrorArtifact) -> Self {
        ResultArtifact::Error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::request::fixtures::body;

    #[test]
    fn test_response_copies_snapshot_fields() {
        let req = InferenceRequest::seal(body()).unwrap();
        let resp = ResponseArtifact::for_request(&req, "ok".to_string(), None);
        assert_eq!(resp.snapshot_hash, req.body.snapshot_hash);
        assert_eq!(resp.snapshot_artifact_id, req.body.snapshot_artifact_id);
        assert_eq!(resp.work_order_id, req.body.work_order_id);
        assert_eq!(resp.response_id, format!("{}--response", req.request_id));
    }

    #[test]
    fn test_result_accessors() {
        let req = InferenceRequest::seal(body()).unwrap();
        let err: ResultArtifact = ErrorArtifact::for_request(
            &req,
            ErrorType::ProviderTimeout,
            "provider_timeout".to_string(),
            "timed out".to_string(),
        )
        .into();
        assert_eq!(err.kind(), ArtifactKind::Error);
        assert_eq!(err.request_id(), Some(req.request_id.as_str()));
        assert!(err.id().ends_with("--error"));
    }

    #[test]
    fn test_usage_is_nullable() {
        let req = InferenceRequest::seal(body()).unwrap();
        let resp = ResponseArtifact::for_request(&req, "ok".to_string(), None);
        let value = serde_json::to_value(&resp).unwrap();
        assert!(value["usage"].is_null());
    }
}
