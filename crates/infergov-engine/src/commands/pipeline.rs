//! Submission pipeline
//!
//! ## Stages (in order):
//! 1. Policy Gate (reject: candidate-keyed error artifact, no receipt)
//! 2. Seal the request (hash-derived id)
//! 3. Existing receipt short-circuit (no validation, no provider call)
//! 4. Snapshot Binding Validator (reject: request + error + rejected receipt)
//! 5. Provider call under the policy timeout (the only await point)
//! 6. Emit request and result, then bind the receipt
//!
//! A stored receipt answers every later identical submission, even after
//! the resolvers change. Nothing is written before stage 6 on the accept
//! path, so dropping the future during the provider call leaves the store
//! untouched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use infergov_core::binding::{SnapshotBindingValidator, SnapshotResolver, WorkOrderResolver};
use infergov_core::errors::{GovErrorKind, Result};
use infergov_core::invoker::{
    ProviderCall, ProviderFailure, ProviderFailureKind, ProviderInvoker, ProviderOutput,
};
use infergov_core::model::{
    derived_id, ArtifactKind, ErrorType, InferenceRequest, Receipt, ReceiptStatus, ResultArtifact,
};
use infergov_core::policy::{PolicyGate, PolicyMatrix, Rejection, Verdict};
use infergov_core::{log_op_end, log_op_error, log_op_start};
use infergov_core_types::RequestContext;
use infergov_store::ArtifactStore;
use serde_json::Value;
use tracing::Instrument;

use super::binder::ReceiptBinder;
use super::emitter::ResultEmitter;
use super::replay::{ReplayVerdict, ReplayVerifier};

const OP: &str = "submit";

/// Reason recorded on success receipts
pub const REASON_COMPLETED: &str = "completed";

/// What a submission produced
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Refused before the provider boundary
    ///
    /// `receipt` is `None` when the gate refused the candidate, because no
    /// request artifact exists to bind.
    Rejected {
        rejection: Rejection,
        error_artifact_id: String,
        receipt: Option<Receipt>,
    },
    /// Provider was called, or an earlier identical submission already
    /// holds a receipt (`reused`, whatever that receipt's status)
    Receipted { receipt: Receipt, reused: bool },
}

impl Submission {
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Submission::Rejected { receipt, .. } => receipt.as_ref(),
            Submission::Receipted { receipt, .. } => Some(receipt),
        }
    }

    pub fn status(&self) -> ReceiptStatus {
        match self {
            Submission::Rejected { .. } => ReceiptStatus::Rejected,
            Submission::Receipted { receipt, .. } => receipt.status(),
        }
    }
}

/// Request-submission and replay entry points over one store
///
/// Cheap to clone; independent pipelines may share the same store.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<ArtifactStore>,
    policy: Arc<PolicyMatrix>,
    snapshots: Arc<dyn SnapshotResolver>,
    work_orders: Arc<dyn WorkOrderResolver>,
    invoker: Arc<dyn ProviderInvoker>,
}

impl Pipeline {
    pub fn new(
        store: Arc<ArtifactStore>,
        policy: Arc<PolicyMatrix>,
        snapshots: Arc<dyn SnapshotResolver>,
        work_orders: Arc<dyn WorkOrderResolver>,
        invoker: Arc<dyn ProviderInvoker>,
    ) -> Self {
        Self {
            store,
            policy,
            snapshots,
            work_orders,
            invoker,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn policy(&self) -> &PolicyMatrix {
        &self.policy
    }

    /// Submit a candidate request under a fresh trace
    ///
    /// # Errors
    ///
    /// Only integrity and operational faults (`ArtifactConflict`,
    /// `LinkageInvalid`, I/O, database). Policy, binding and provider
    /// outcomes are returned as a [`Submission`].
    pub async fn submit(&self, candidate: &Value) -> Result<Submission> {
        self.submit_in(&RequestContext::new(), candidate).await
    }

    /// Submit a candidate request, correlating logs with `ctx`
    ///
    /// # Errors
    ///
    /// See [`Pipeline::submit`].
    pub async fn submit_in(&self, ctx: &RequestContext, candidate: &Value) -> Result<Submission> {
        let span = tracing::info_span!(
            "submission",
            trace_id = %ctx.trace_id,
            span_id = %ctx.span(),
            caller = ctx.caller.as_deref().unwrap_or("unknown"),
        );
        async {
            log_op_start!(OP);
            let start = Instant::now();

            let submission = self.submit_impl(candidate).await.map_err(|e| {
                log_op_error!(OP, e.clone(), duration_ms = start.elapsed().as_millis() as u64);
                e
            })?;

            log_op_end!(
                OP,
                duration_ms = start.elapsed().as_millis() as u64,
                status = submission.status().as_str(),
                receipt_id = submission.receipt().map(Receipt::receipt_id).unwrap_or("none")
            );
            Ok(submission)
        }
        .instrument(span)
        .await
    }

    /// Verify a stored receipt
    ///
    /// # Errors
    ///
    /// See [`ReplayVerifier::verify`].
    pub fn replay(&self, receipt_id: &str) -> Result<ReplayVerdict> {
        ReplayVerifier::new(&self.store).verify(receipt_id)
    }

    async fn submit_impl(&self, candidate: &Value) -> Result<Submission> {
        let emitter = ResultEmitter::new(&self.store);

        let body = match PolicyGate::evaluate(candidate, &self.policy) {
            Verdict::Accept(body) => body,
            Verdict::Reject(rejection) => {
                tracing::info!(reason = %rejection.reason_string(), "candidate refused by policy gate");
                let error = emitter.emit_rejection(candidate, &rejection)?;
                return Ok(Submission::Rejected {
                    rejection,
                    error_artifact_id: error.record.error_id,
                    receipt: None,
                });
            }
        };
        let request = InferenceRequest::seal(body)?;

        let receipt_id = derived_id(&request.request_id, ArtifactKind::Receipt);
        if self.store.exists(ArtifactKind::Receipt, &receipt_id)? {
            let receipt: Receipt = self.store.read_record(ArtifactKind::Receipt, &receipt_id)?;
            tracing::debug!(receipt_id = receipt_id.as_str(), "reusing existing receipt");
            return Ok(Submission::Receipted {
                receipt,
                reused: true,
            });
        }

        let validator = SnapshotBindingValidator::new(&*self.snapshots, &*self.work_orders);
        if let Verdict::Reject(rejection) = validator.validate(&request.body) {
            tracing::info!(
                request_id = request.request_id.as_str(),
                reason = %rejection.reason_string(),
                "request refused by snapshot binding"
            );
            return self.record_binding_rejection(&request, rejection);
        }

        let outcome = self.call_provider(&request).await;

        emitter.emit_request(&request)?;
        let (result, status, reason) = match outcome {
            Ok(output) => self.record_success(&emitter, &request, output)?,
            Err(failure) => {
                let error_type = failure.kind.error_type();
                let error = emitter.emit_failure(
                    &request,
                    error_type,
                    error_type.as_str(),
                    failure.message.expose(),
                )?;
                (
                    ResultArtifact::from(error.record),
                    ReceiptStatus::Error,
                    error_type.as_str().to_string(),
                )
            }
        };

        let receipt = ReceiptBinder::new(&self.store).bind(&request, Some(&result), status, &reason)?;
        Ok(Submission::Receipted {
            receipt: receipt.record,
            reused: false,
        })
    }

    async fn call_provider(
        &self,
        request: &InferenceRequest,
    ) -> std::result::Result<ProviderOutput, ProviderFailure> {
        let limit_ms = self.policy.provider_timeout_ms;
        let call = ProviderCall::from_request(request);
        tracing::debug!(
            request_id = request.request_id.as_str(),
            provider = request.body.provider.as_str(),
            model = request.body.model.as_str(),
            timeout_ms = limit_ms,
            "calling provider"
        );
        match tokio::time::timeout(Duration::from_millis(limit_ms), self.invoker.call(call)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderFailure::new(
                ProviderFailureKind::Timeout,
                format!("provider call exceeded {} ms", limit_ms),
            )),
        }
    }

    /// Store the response; output that cannot be canonicalized becomes an error
    fn record_success(
        &self,
        emitter: &ResultEmitter<'_>,
        request: &InferenceRequest,
        output: ProviderOutput,
    ) -> Result<(ResultArtifact, ReceiptStatus, String)> {
        match emitter.emit_success(request, output.text, output.usage) {
            Ok(response) => Ok((
                ResultArtifact::from(response.record),
                ReceiptStatus::Success,
                REASON_COMPLETED.to_string(),
            )),
            Err(e) if e.is(GovErrorKind::Encoding) => {
                let error_type = ErrorType::OutputCanonicalizationFailed;
                let error =
                    emitter.emit_failure(request, error_type, error_type.as_str(), e.message())?;
                Ok((
                    ResultArtifact::from(error.record),
                    ReceiptStatus::Error,
                    error_type.as_str().to_string(),
                ))
            }
            Err(e) => Err(e),
        }
    }

    fn record_binding_rejection(
        &self,
        request: &InferenceRequest,
        rejection: Rejection,
    ) -> Result<Submission> {
        let emitter = ResultEmitter::new(&self.store);
        let reason = rejection.reason_string();

        emitter.emit_request(request)?;
        let error = emitter.emit_failure(request, rejection.error_type, &reason, &rejection.describe())?;
        let receipt =
            ReceiptBinder::new(&self.store).bind(request, None, ReceiptStatus::Rejected, &reason)?;

        Ok(Submission::Rejected {
            rejection,
            error_artifact_id: error.record.error_id,
            receipt: Some(receipt.record),
        })
    }
}
