use serde::{Deserialize, Serialize};

use super::{ArtifactKind, Provider};
use crate::codec::{self, EncodingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Rejected,
    Success,
    Error,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Rejected => "rejected",
            ReceiptStatus::Success => "success",
            ReceiptStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SHA-256 of the stored bytes of every artifact the receipt covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHashes {
    pub request_sha256: String,
    pub result_sha256: Option<String>,
}

/// Everything in a receipt except its own hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptBody {
    /// Always `ArtifactKind::Receipt`
    pub kind: ArtifactKind,
    pub receipt_id: String,
    pub request_id: String,
    pub request_hash: String,
    pub work_order_id: Option<String>,
    pub snapshot_hash: String,
    pub snapshot_artifact_id: String,
    pub provider: Provider,
    pub model: String,
    pub status: ReceiptStatus,
    pub reason: String,
    pub created_at_utc: String,
    pub input_artifact_ids: Vec<String>,
    pub response_id: Option<String>,
    pub error_id: Option<String>,
    pub artifact_hashes: ArtifactHashes,
}

impl ReceiptBody {
    /// Rejected: both references null. Otherwise exactly one is set and it
    /// matches the status.
    pub fn references_are_exclusive(&self) -> bool {
        match self.status {
            ReceiptStatus::Rejected => self.response_id.is_none() && self.error_id.is_none(),
            ReceiptStatus::Success => self.response_id.is_some() && self.error_id.is_none(),
            ReceiptStatus::Error => self.response_id.is_none() && self.error_id.is_some(),
        }
    }

    /// The result this receipt points at, if any
    pub fn result_ref(&self) -> Option<(ArtifactKind, &str)> {
        match (&self.response_id, &self.error_id) {
            (Some(id), None) => Some((ArtifactKind::Response, id)),
            (None, Some(id)) => Some((ArtifactKind::Error, id)),
            _ => None,
        }
    }
}

/// Ledger-safe summary of one request's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// SHA-256 of the canonical body, i.e. the stored record minus this field
    pub receipt_hash: String,
    #[serde(flatten)]
    pub body: ReceiptBody,
}

impl Receipt {
    /// # Errors
    ///
    /// Returns an `EncodingError` if the body has no canonical form.
    pub fn seal(body: ReceiptBody) -> Result<Self, EncodingError> {
        Ok(Self {
            receipt_hash: codec::canonical_hash(&body)?,
            body,
        })
    }

    pub fn receipt_id(&self) -> &str {
        &self.body.receipt_id
    }

    pub fn status(&self) -> ReceiptStatus {
        self.body.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(status: ReceiptStatus, response: Option<&str>, error: Option<&str>) -> ReceiptBody {
        ReceiptBody {
            kind: ArtifactKind::Receipt,
            receipt_id: "r--receipt".to_string(),
            request_id: "r".to_string(),
            request_hash: "b".repeat(64),
            work_order_id: None,
            snapshot_hash: "a".repeat(64),
            snapshot_artifact_id: "snap".to_string(),
            provider: Provider::Anthropic,
            model: "claude-3-haiku".to_string(),
            status,
            reason: "completed".to_string(),
            created_at_utc: "2026-01-15T10:00:00Z".to_string(),
            input_artifact_ids: vec![],
            response_id: response.map(str::to_string),
            error_id: error.map(str::to_string),
            artifact_hashes: ArtifactHashes {
                request_sha256: "c".repeat(64),
                result_sha256: None,
            },
        }
    }

    #[test]
    fn test_exclusivity_rules() {
        assert!(body(ReceiptStatus::Rejected, None, None).references_are_exclusive());
        assert!(!body(ReceiptStatus::Rejected, Some("x"), None).references_are_exclusive());
        assert!(body(ReceiptStatus::Success, Some("x"), None).references_are_exclusive());
        assert!(!body(ReceiptStatus::Success, None, Some("e")).references_are_exclusive());
        assert!(!body(ReceiptStatus::Error, Some("x"), Some("e")).references_are_exclusive());
        assert!(body(ReceiptStatus::Error, None, Some("e")).references_are_exclusive());
    }

    #[test]
    fn test_hash_excludes_itself() {
        let receipt = Receipt::seal(body(ReceiptStatus::Success, Some("x"), None)).unwrap();
        let mut value = serde_json::to_value(&receipt).unwrap();
        value
            .as_object_mut()
            .map(|m| m.remove("receipt_hash"))
            .unwrap();
        let recomputed = codec::hash_hex(&codec::canonical_value_bytes(&value).unwrap());
        assert_eq!(recomputed, receipt.receipt_hash);
    }
}
