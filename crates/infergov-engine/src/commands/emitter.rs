//! Result Emitter
//!
//! Turns a sealed request, a provider outcome, or a refused candidate
//! into stored artifacts. Every write goes through the codec and the
//! store, so repeating an emission with the same inputs is a no-op.

use infergov_core::codec;
use infergov_core::errors::Result;
use infergov_core::model::{
    derived_id, is_valid_artifact_id, ArtifactKind, ErrorArtifact, ErrorType, InferenceRequest,
    Provider, ResponseArtifact, ResultArtifact, TokenUsage,
};
use infergov_core::policy::Rejection;
use infergov_core::scrub::scrub_message;
use infergov_store::{ArtifactStore, StoredArtifact, WriteMeta};
use serde_json::Value;

/// A record together with what the store holds for it
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted<T> {
    pub record: T,
    pub stored: StoredArtifact,
}

pub struct ResultEmitter<'a> {
    store: &'a ArtifactStore,
}

impl<'a> ResultEmitter<'a> {
    pub fn new(store: &'a ArtifactStore) -> Self {
        Self { store }
    }

    /// Persist the request; its parents are the snapshot and the inputs
    pub fn emit_request(&self, request: &InferenceRequest) -> Result<Emitted<InferenceRequest>> {
        let body = &request.body;
        let mut parents = Vec::with_capacity(body.input_artifact_ids.len() + 1);
        parents.push(body.snapshot_artifact_id.clone());
        parents.extend(body.input_artifact_ids.iter().cloned());

        let stored = self.store.write_record(
            ArtifactKind::Request,
            &request.request_id,
            request,
            &WriteMeta::new(Some(body.created_at_utc.clone()), parents),
        )?;
        Ok(Emitted {
            record: request.clone(),
            stored,
        })
    }

    /// Wrap provider output into the request's response artifact
    ///
    /// # Errors
    ///
    /// `ArtifactConflict` if an error artifact already exists for the
    /// request, or a different response does. The check commits atomically
    /// with the write, so a racing `emit_failure` cannot also land.
    pub fn emit_success(
        &self,
        request: &InferenceRequest,
        output_text: String,
        usage: Option<TokenUsage>,
    ) -> Result<Emitted<ResponseArtifact>> {
        let response = ResponseArtifact::for_request(request, output_text, usage);
        let stored = self.store.write_record(
            ArtifactKind::Response,
            &response.response_id,
            &response,
            &result_meta(request, ArtifactKind::Error),
        )?;
        Ok(Emitted {
            record: response,
            stored,
        })
    }

    /// Record a classified failure for a sealed request
    ///
    /// `raw_message` is scrubbed against the request's prompts before it
    /// is stored.
    pub fn emit_failure(
        &self,
        request: &InferenceRequest,
        error_type: ErrorType,
        reason: &str,
        raw_message: &str,
    ) -> Result<Emitted<ErrorArtifact>> {
        let prompts = &request.body.prompts;
        let mut redact = vec![prompts.user_input.as_str()];
        if let Some(system) = &prompts.system_prompt {
            redact.push(system.as_str());
        }
        let error = ErrorArtifact::for_request(
            request,
            error_type,
            reason.to_string(),
            scrub_message(raw_message, &redact),
        );
        let stored = self.store.write_record(
            ArtifactKind::Error,
            &error.error_id,
            &error,
            &result_meta(request, ArtifactKind::Response),
        )?;
        Ok(Emitted {
            record: error,
            stored,
        })
    }

    /// Record why a candidate never became a request
    ///
    /// The artifact is keyed by the candidate's canonical hash. Only
    /// context fields that are well-formed are copied; prompt text never is.
    pub fn emit_rejection(
        &self,
        candidate: &Value,
        rejection: &Rejection,
    ) -> Result<Emitted<ErrorArtifact>> {
        let candidate_hash = codec::hash_hex(&codec::canonical_value_bytes(candidate)?);
        let error_id = derived_id(&candidate_hash, ArtifactKind::Error);

        let text = |field: &str| candidate.get(field).and_then(Value::as_str);
        let id_field = |field: &str| text(field).filter(|s| is_valid_artifact_id(s)).map(str::to_string);

        let created_at_utc = text("created_at_utc")
            .filter(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
            .map(str::to_string);
        let error = ErrorArtifact {
            kind: ArtifactKind::Error,
            error_id: error_id.clone(),
            created_at_utc: created_at_utc.clone(),
            request_id: None,
            request_hash: None,
            work_order_id: id_field("work_order_id"),
            snapshot_hash: text("snapshot_hash")
                .filter(|s| codec::is_sha256_hex(s))
                .map(str::to_string),
            snapshot_artifact_id: id_field("snapshot_artifact_id"),
            provider: text("provider").and_then(Provider::parse),
            model: id_field("model"),
            error_type: rejection.error_type,
            reason: rejection.reason_string(),
            message: rejection.describe(),
        };
        let stored = self.store.write_record(
            ArtifactKind::Error,
            &error_id,
            &error,
            &WriteMeta::new(created_at_utc, Vec::new()),
        )?;
        Ok(Emitted {
            record: error,
            stored,
        })
    }
}

/// Canonical bytes of whichever result variant this is
pub fn result_bytes(result: &ResultArtifact) -> Result<Vec<u8>> {
    let bytes = match result {
        ResultArtifact::Response(r) => codec::canonicalize(r)?,
        ResultArtifact::Error(e) => codec::canonicalize(e)?,
    };
    Ok(bytes)
}

/// Results hang off the request and exclude the request's other result kind
fn result_meta(request: &InferenceRequest, other: ArtifactKind) -> WriteMeta {
    WriteMeta::new(
        Some(request.body.created_at_utc.clone()),
        vec![request.request_id.clone()],
    )
    .exclusive_with(other, derived_id(&request.request_id, other))
}
