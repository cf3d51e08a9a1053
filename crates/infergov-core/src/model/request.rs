use serde::{Deserialize, Serialize};

use super::{ArtifactKind, Provider};
use crate::codec::{self, EncodingError};

/// Sampling parameters, always explicit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    #[serde(serialize_with = "codec::finite_f64")]
    pub temperature: f64,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompts {
    /// `None` is an explicit absence, serialized as `null`
    pub system_prompt: Option<String>,
    pub user_input: String,
}

/// The hashed portion of a request
///
/// Produced only by the Policy Gate, so every field has been checked.
/// There is no `Default`: nothing here may be filled in silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Always `ArtifactKind::Request`
    pub kind: ArtifactKind,

    /// Injected by the caller (RFC 3339); never read from a local clock
    pub created_at_utc: String,

    pub work_order_id: Option<String>,

    /// Content hash the caller claims for the snapshot
    pub snapshot_hash: String,
    pub snapshot_artifact_id: String,

    pub provider: Provider,

    /// Exact model name; aliases and floating tags are rejected upstream
    pub model: String,

    pub params: RequestParams,
    pub prompts: Prompts,

    /// Ordered, duplicate-free
    pub input_artifact_ids: Vec<String>,
}

/// A sealed inference request
///
/// `request_id` equals `request_hash`, the SHA-256 of the canonical body,
/// so resubmitting identical content lands on the same artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub request_id: String,
    pub request_hash: String,
    #[serde(flatten)]
    pub body: RequestBody,
}

impl InferenceRequest {
    /// Hash the body and derive the id from it
    ///
    /// # Errors
    ///
    /// Returns an `EncodingError` if the body has no canonical form.
    pub fn seal(body: RequestBody) -> Result<Self, EncodingError> {
        let request_hash = codec::canonical_hash(&body)?;
        Ok(Self {
            request_id: request_hash.clone(),
            request_hash,
            body,
        })
    }

    /// Recompute the body hash (used by replay and linkage checks)
    ///
    /// # Errors
    ///
    /// Returns an `EncodingError` if the body has no canonical form.
    pub fn recompute_hash(&self) -> Result<String, EncodingError> {
        codec::canonical_hash(&self.body)
    }

    pub fn is_sealed_consistently(&self) -> bool {
        self.recompute_hash()
            .map(|h| h == self.request_hash && h == self.request_id)
            .unwrap_or(false)
    }
}
