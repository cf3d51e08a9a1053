use serde::{Deserialize, Serialize};

/// The four persisted record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    #[serde(rename = "inference.request")]
    Request,
    #[serde(rename = "inference.response")]
    Response,
    #[serde(rename = "inference.error")]
    Error,
    #[serde(rename = "inference.receipt")]
    Receipt,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Request,
        ArtifactKind::Response,
        ArtifactKind::Error,
        ArtifactKind::Receipt,
    ];

    /// Tag carried in the record's own `kind` field
    pub fn record_tag(&self) -> &'static str {
        match self {
            ArtifactKind::Request => "inference.request",
            ArtifactKind::Response => "inference.response",
            ArtifactKind::Error => "inference.error",
            ArtifactKind::Receipt => "inference.receipt",
        }
    }

    /// Kind column value in the registry
    pub fn registry_label(&self) -> &'static str {
        match self {
            ArtifactKind::Request => "INFERENCE_REQUEST",
            ArtifactKind::Response => "INFERENCE_RESPONSE",
            ArtifactKind::Error => "INFERENCE_ERROR",
            ArtifactKind::Receipt => "INFERENCE_RECEIPT",
        }
    }

    pub fn from_registry_label(label: &str) -> Option<ArtifactKind> {
        Self::ALL.into_iter().find(|k| k.registry_label() == label)
    }

    /// Partition directory under the store root
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Request => "requests",
            ArtifactKind::Response => "responses",
            ArtifactKind::Error => "errors",
            ArtifactKind::Receipt => "receipts",
        }
    }

    /// Accepts either the registry label or the short CLI form (`response`)
    pub fn parse_loose(s: &str) -> Option<ArtifactKind> {
        Self::from_registry_label(s).or_else(|| {
            Self::ALL
                .into_iter()
                .find(|k| k.record_tag() == s || k.record_tag().strip_prefix("inference.") == Some(s))
        })
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.registry_label())
    }
}

/// serde adapter writing the registry label instead of the record tag
pub mod registry_label {
    use super::ArtifactKind;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(kind: &ArtifactKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(kind.registry_label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ArtifactKind, D::Error> {
        let label = String::deserialize(d)?;
        ArtifactKind::from_registry_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown registry kind: {}", label)))
    }
}
