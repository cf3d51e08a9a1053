//! Receipt Binder
//!
//! Links a stored request and its stored result (or none, for a
//! rejection) into a receipt. Every linkage check runs before the receipt
//! is written; on failure nothing is written and any result artifact
//! stays in the store as an orphan that audit can still see.

use infergov_core::codec;
use infergov_core::errors::{linkage_invalid, Result};
use infergov_core::model::{
    derived_id, ArtifactHashes, ArtifactKind, InferenceRequest, Receipt, ReceiptBody,
    ReceiptStatus, ResultArtifact,
};
use infergov_core::{log_op_end, log_op_error, log_op_start};
use infergov_store::{ArtifactStore, WriteMeta};

use super::emitter::{result_bytes, Emitted};

const OP: &str = "receipt_bind";

pub struct ReceiptBinder<'a> {
    store: &'a ArtifactStore,
}

impl<'a> ReceiptBinder<'a> {
    pub fn new(store: &'a ArtifactStore) -> Self {
        Self { store }
    }

    /// Bind `request` and `result` into a receipt
    ///
    /// # Errors
    ///
    /// - `LinkageInvalid` if the request or result is not stored as given,
    ///   the result does not point back at this request, or `status`
    ///   disagrees with the result variant
    /// - `ArtifactConflict` if a different receipt already exists for the
    ///   request
    pub fn bind(
        &self,
        request: &InferenceRequest,
        result: Option<&ResultArtifact>,
        status: ReceiptStatus,
        reason: &str,
    ) -> Result<Emitted<Receipt>> {
        log_op_start!(OP, request_id = request.request_id.as_str(), status = status.as_str());
        let start = std::time::Instant::now();

        let emitted = self.bind_impl(request, result, status, reason).map_err(|e| {
            log_op_error!(
                OP,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request.request_id.as_str()
            );
            e
        })?;

        log_op_end!(
            OP,
            duration_ms = start.elapsed().as_millis() as u64,
            receipt_id = emitted.record.receipt_id(),
            write_outcome = emitted.stored.outcome.as_str()
        );
        Ok(emitted)
    }

    fn bind_impl(
        &self,
        request: &InferenceRequest,
        result: Option<&ResultArtifact>,
        status: ReceiptStatus,
        reason: &str,
    ) -> Result<Emitted<Receipt>> {
        if reason.trim().is_empty() {
            return Err(linkage_invalid(OP, "receipt reason must be non-empty"));
        }
        let request_sha256 = self.check_request(request)?;

        let (response_id, error_id, result_sha256) = match (status, result) {
            (ReceiptStatus::Rejected, None) => (None, None, None),
            (ReceiptStatus::Rejected, Some(_)) => {
                return Err(linkage_invalid(OP, "rejected receipt cannot reference a result"))
            }
            (ReceiptStatus::Success, Some(r)) if r.kind() == ArtifactKind::Response => {
                let sha = self.check_result(request, r)?;
                (Some(r.id().to_string()), None, Some(sha))
            }
            (ReceiptStatus::Error, Some(r)) if r.kind() == ArtifactKind::Error => {
                let sha = self.check_result(request, r)?;
                (None, Some(r.id().to_string()), Some(sha))
            }
            (status, result) => {
                return Err(linkage_invalid(
                    OP,
                    format!(
                        "status '{}' does not match result {:?}",
                        status,
                        result.map(|r| r.kind().registry_label())
                    ),
                ))
            }
        };

        let body = &request.body;
        let receipt = Receipt::seal(ReceiptBody {
            kind: ArtifactKind::Receipt,
            receipt_id: derived_id(&request.request_id, ArtifactKind::Receipt),
            request_id: request.request_id.clone(),
            request_hash: request.request_hash.clone(),
            work_order_id: body.work_order_id.clone(),
            snapshot_hash: body.snapshot_hash.clone(),
            snapshot_artifact_id: body.snapshot_artifact_id.clone(),
            provider: body.provider,
            model: body.model.clone(),
            status,
            reason: reason.to_string(),
            created_at_utc: body.created_at_utc.clone(),
            input_artifact_ids: body.input_artifact_ids.clone(),
            response_id,
            error_id,
            artifact_hashes: ArtifactHashes {
                request_sha256,
                result_sha256,
            },
        })?;

        let mut parents = vec![request.request_id.clone()];
        if let Some((_, result_id)) = receipt.body.result_ref() {
            parents.push(result_id.to_string());
        }
        let stored = self.store.write_record(
            ArtifactKind::Receipt,
            receipt.receipt_id(),
            &receipt,
            &WriteMeta::new(Some(body.created_at_utc.clone()), parents),
        )?;
        Ok(Emitted {
            record: receipt,
            stored,
        })
    }

    /// The request must be sealed consistently and stored byte-for-byte
    fn check_request(&self, request: &InferenceRequest) -> Result<String> {
        if !request.is_sealed_consistently() {
            return Err(linkage_invalid(OP, "request id/hash do not match its body")
                .with_artifact(ArtifactKind::Request, request.request_id.clone()));
        }
        let expected = codec::hash_hex(&codec::canonicalize(request)?);
        match self.store.entry(ArtifactKind::Request, &request.request_id)? {
            None => Err(linkage_invalid(OP, "request artifact is not stored")
                .with_artifact(ArtifactKind::Request, request.request_id.clone())),
            Some(entry) if entry.sha256 != expected => {
                Err(linkage_invalid(OP, "stored request differs from the one being bound")
                    .with_artifact(ArtifactKind::Request, request.request_id.clone()))
            }
            Some(entry) => Ok(entry.sha256),
        }
    }

    /// The result must point back at this request and be stored as given
    fn check_result(&self, request: &InferenceRequest, result: &ResultArtifact) -> Result<String> {
        let kind = result.kind();
        let id = result.id().to_string();
        let fail = |msg: &str| Err(linkage_invalid(OP, msg).with_artifact(kind, id.clone()));

        if result.declared_kind() != kind {
            return fail("result kind tag does not match its type");
        }
        if result.request_id() != Some(request.request_id.as_str())
            || result.request_hash() != Some(request.request_hash.as_str())
        {
            return fail("result references a different request");
        }
        if id != derived_id(&request.request_id, kind) {
            return fail("result id is not derived from the request id");
        }
        if let ResultArtifact::Response(response) = result {
            let body = &request.body;
            if response.snapshot_hash != body.snapshot_hash
                || response.snapshot_artifact_id != body.snapshot_artifact_id
                || response.work_order_id != body.work_order_id
                || response.provider != body.provider
                || response.model != body.model
            {
                return fail("response does not copy the request's binding fields");
            }
        }

        let expected = codec::hash_hex(&result_bytes(result)?);
        match self.store.entry(kind, &id)? {
            None => fail("result artifact is not stored"),
            Some(entry) if entry.sha256 != expected => {
                fail("stored result differs from the one being bound")
            }
            Some(entry) => Ok(entry.sha256),
        }
    }
}
