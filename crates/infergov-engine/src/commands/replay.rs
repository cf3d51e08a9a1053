//! Replay Verifier
//!
//! Read-only recomputation of every hash in a receipt's closure. Any
//! discrepancy is reported, never repaired.
//!
//! ## Checks (in order):
//! 1. Receipt is registered and its file exists
//! 2. Receipt bytes hash to the registered sha256
//! 3. `receipt_hash` matches the canonical payload without that field
//! 4. Receipt parses, names itself, and obeys reference exclusivity
//! 5. Request bytes hash to both the registry and `artifact_hashes`
//! 6. Request body re-hashes to its `request_hash`
//! 7. Result (if any) bytes hash to both the registry and `artifact_hashes`
//!    and point back at the request
//!
//! If the receipt itself fails 2-4, its references are not followed.

use infergov_core::codec::{self, hash_hex};
use infergov_core::errors::{GovErrorKind, Result};
use infergov_core::model::{ArtifactKind, InferenceRequest, Receipt, ReceiptStatus};
use infergov_core::{log_op_end, log_op_error, log_op_start};
use infergov_store::ArtifactStore;
use serde_json::Value;

const OP: &str = "replay_verify";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub kind: ArtifactKind,
    pub artifact_id: String,
}

impl ArtifactRef {
    pub fn new(kind: ArtifactKind, artifact_id: impl Into<String>) -> Self {
        Self {
            kind,
            artifact_id: artifact_id.into(),
        }
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.registry_label(), self.artifact_id)
    }
}

/// One failed comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchDetail {
    pub artifact: ArtifactRef,
    /// What was compared, e.g. `sha256_vs_registry`
    pub check: &'static str,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub receipt_id: String,
    pub receipt_hash: String,
    pub status: ReceiptStatus,
    /// Every artifact whose bytes were re-hashed, receipt first
    pub verified: Vec<ArtifactRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayVerdict {
    Match(ReplayReport),
    Mismatch(Vec<MismatchDetail>),
    MissingArtifact(ArtifactRef),
}

impl ReplayVerdict {
    pub fn is_match(&self) -> bool {
        matches!(self, ReplayVerdict::Match(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReplayVerdict::Match(_) => "match",
            ReplayVerdict::Mismatch(_) => "mismatch",
            ReplayVerdict::MissingArtifact(_) => "missing_artifact",
        }
    }
}

/// Bytes of an artifact, or the verdict that ends verification early
enum Fetched {
    Bytes { bytes: Vec<u8>, registered_sha256: String },
    Missing(ArtifactRef),
}

pub struct ReplayVerifier<'a> {
    store: &'a ArtifactStore,
}

impl<'a> ReplayVerifier<'a> {
    pub fn new(store: &'a ArtifactStore) -> Self {
        Self { store }
    }

    /// Verify the closure of `receipt_id`
    ///
    /// # Errors
    ///
    /// Only for operational faults (I/O, database). Tampering and missing
    /// artifacts are verdicts, not errors.
    pub fn verify(&self, receipt_id: &str) -> Result<ReplayVerdict> {
        log_op_start!(OP, receipt_id = receipt_id);
        let start = std::time::Instant::now();

        let verdict = self.verify_impl(receipt_id).map_err(|e| {
            log_op_error!(OP, e.clone(), duration_ms = start.elapsed().as_millis() as u64);
            e
        })?;

        log_op_end!(
            OP,
            duration_ms = start.elapsed().as_millis() as u64,
            receipt_id = receipt_id,
            status = verdict.label()
        );
        Ok(verdict)
    }

    fn verify_impl(&self, receipt_id: &str) -> Result<ReplayVerdict> {
        let receipt_ref = ArtifactRef::new(ArtifactKind::Receipt, receipt_id);
        let mut mismatches = Vec::new();

        // ---- receipt ----
        let (bytes, registered) = match self.fetch(&receipt_ref)? {
            Fetched::Missing(which) => return Ok(ReplayVerdict::MissingArtifact(which)),
            Fetched::Bytes {
                bytes,
                registered_sha256,
            } => (bytes, registered_sha256),
        };
        compare(
            &mut mismatches,
            &receipt_ref,
            "sha256_vs_registry",
            &registered,
            &hash_hex(&bytes),
        );

        let mut value: Value = match codec::decode(&bytes) {
            Ok(v) => v,
            Err(e) => {
                mismatches.push(detail(&receipt_ref, "payload_parse", "canonical JSON", &e.to_string()));
                return Ok(ReplayVerdict::Mismatch(mismatches));
            }
        };
        let stored_hash = value
            .as_object_mut()
            .and_then(|m| m.remove("receipt_hash"))
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let recomputed = hash_hex(&codec::canonical_value_bytes(&value)?);
        compare(&mut mismatches, &receipt_ref, "receipt_hash", &stored_hash, &recomputed);

        let receipt: Receipt = match codec::decode(&bytes) {
            Ok(r) => r,
            Err(e) => {
                mismatches.push(detail(&receipt_ref, "receipt_schema", "receipt record", &e.to_string()));
                return Ok(ReplayVerdict::Mismatch(mismatches));
            }
        };
        compare(
            &mut mismatches,
            &receipt_ref,
            "receipt_id",
            receipt_id,
            receipt.receipt_id(),
        );
        if !receipt.body.references_are_exclusive() {
            mismatches.push(detail(
                &receipt_ref,
                "result_reference_exclusivity",
                receipt.status().as_str(),
                &format!(
                    "response_id={:?} error_id={:?}",
                    receipt.body.response_id, receipt.body.error_id
                ),
            ));
        }
        if !mismatches.is_empty() {
            return Ok(ReplayVerdict::Mismatch(mismatches));
        }

        let mut verified = vec![receipt_ref.clone()];
        let hashes = &receipt.body.artifact_hashes;

        // ---- request ----
        let request_ref = ArtifactRef::new(ArtifactKind::Request, &receipt.body.request_id);
        let request_bytes = match self.fetch(&request_ref)? {
            Fetched::Missing(which) => return Ok(ReplayVerdict::MissingArtifact(which)),
            Fetched::Bytes {
                bytes,
                registered_sha256,
            } => {
                let actual = hash_hex(&bytes);
                compare(&mut mismatches, &request_ref, "sha256_vs_registry", &registered_sha256, &actual);
                compare(&mut mismatches, &request_ref, "sha256_vs_receipt", &hashes.request_sha256, &actual);
                bytes
            }
        };
        match codec::decode::<InferenceRequest>(&request_bytes) {
            Ok(request) => {
                let rehashed = request.recompute_hash()?;
                compare(&mut mismatches, &request_ref, "request_hash", &request.request_hash, &rehashed);
                compare(
                    &mut mismatches,
                    &request_ref,
                    "request_hash_vs_receipt",
                    &receipt.body.request_hash,
                    &rehashed,
                );
            }
            Err(e) => mismatches.push(detail(&request_ref, "request_schema", "request record", &e.to_string())),
        }
        verified.push(request_ref);

        // ---- result ----
        match receipt.body.result_ref() {
            None => {
                if let Some(sha) = &hashes.result_sha256 {
                    mismatches.push(detail(&receipt_ref, "result_sha256_without_result", "null", sha));
                }
            }
            Some((kind, id)) => {
                let result_ref = ArtifactRef::new(kind, id);
                match self.fetch(&result_ref)? {
                    Fetched::Missing(which) => return Ok(ReplayVerdict::MissingArtifact(which)),
                    Fetched::Bytes {
                        bytes,
                        registered_sha256,
                    } => {
                        let actual = hash_hex(&bytes);
                        compare(&mut mismatches, &result_ref, "sha256_vs_registry", &registered_sha256, &actual);
                        compare(
                            &mut mismatches,
                            &result_ref,
                            "sha256_vs_receipt",
                            hashes.result_sha256.as_deref().unwrap_or(""),
                            &actual,
                        );
                        let parent = codec::decode::<Value>(&bytes)
                            .ok()
                            .and_then(|v| v.get("request_id").and_then(Value::as_str).map(str::to_string))
                            .unwrap_or_default();
                        compare(&mut mismatches, &result_ref, "request_id", &receipt.body.request_id, &parent);
                    }
                }
                verified.push(result_ref);
            }
        }

        if mismatches.is_empty() {
            Ok(ReplayVerdict::Match(ReplayReport {
                receipt_id: receipt_id.to_string(),
                receipt_hash: receipt.receipt_hash.clone(),
                status: receipt.status(),
                verified,
            }))
        } else {
            Ok(ReplayVerdict::Mismatch(mismatches))
        }
    }

    fn fetch(&self, which: &ArtifactRef) -> Result<Fetched> {
        let Some(entry) = self.store.entry(which.kind, &which.artifact_id)? else {
            return Ok(Fetched::Missing(which.clone()));
        };
        match self.store.read(which.kind, &which.artifact_id) {
            Ok(bytes) => Ok(Fetched::Bytes {
                bytes,
                registered_sha256: entry.sha256,
            }),
            Err(e) if e.is(GovErrorKind::NotFound) => Ok(Fetched::Missing(which.clone())),
            Err(e) => Err(e),
        }
    }
}

fn detail(artifact: &ArtifactRef, check: &'static str, expected: &str, actual: &str) -> MismatchDetail {
    MismatchDetail {
        artifact: artifact.clone(),
        check,
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn compare(
    out: &mut Vec<MismatchDetail>,
    artifact: &ArtifactRef,
    check: &'static str,
    expected: &str,
    actual: &str,
) {
    if expected != actual {
        out.push(detail(artifact, check, expected, actual));
    }
}
