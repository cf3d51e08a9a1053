use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::gate::CANDIDATE_FIELDS;
use crate::errors::{GovError, GovErrorKind, Result};
use crate::model::Provider;

pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 60_000;

const BASELINE_MAX_OUTPUT_TOKENS: u32 = 4096;

const BASELINE_FORBIDDEN_FIELDS: [&str; 5] = [
    "provider_defaults",
    "policy_override",
    "provider_max_tokens_cap",
    "default_model",
    "default_temperature",
];

fn default_timeout_ms() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPolicy {
    /// Exact model names; no patterns
    pub allowed_models: Vec<String>,
    /// Hard ceiling for `max_output_tokens`
    pub max_output_tokens: u32,
}

/// Immutable, versioned governance input
///
/// Loaded once, validated, then shared read-only by every attempt.
/// Provider keys are wire names (`openai`, `anthropic`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMatrix {
    pub version: String,
    pub providers: BTreeMap<String, ProviderPolicy>,
    pub require_system_prompt: bool,
    /// Payload fields that would let a caller override governance
    pub forbidden_fields: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub provider_timeout_ms: u64,
}

impl PolicyMatrix {
    /// The documented default policy
    pub fn baseline() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            Provider::OpenAi.as_str().to_string(),
            ProviderPolicy {
                allowed_models: ["gpt-4o", "gpt-4.1", "gpt-4.1-mini"]
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
                max_output_tokens: BASELINE_MAX_OUTPUT_TOKENS,
            },
        );
        providers.insert(
            Provider::Anthropic.as_str().to_string(),
            ProviderPolicy {
                allowed_models: ["claude-3-opus", "claude-3-sonnet", "claude-3-haiku"]
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
                max_output_tokens: BASELINE_MAX_OUTPUT_TOKENS,
            },
        );
        Self {
            version: "baseline-1".to_string(),
            providers,
            require_system_prompt: false,
            forbidden_fields: BASELINE_FORBIDDEN_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
        }
    }

    /// Parse and validate a TOML policy document
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the document does not parse or fails [`validate`](Self::validate).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let matrix: PolicyMatrix = toml::from_str(s).map_err(|e| {
            GovError::new(GovErrorKind::InvalidConfig)
                .with_op("policy_load")
                .with_message(e.to_string())
        })?;
        matrix.validate()?;
        Ok(matrix)
    }

    pub fn for_provider(&self, provider: Provider) -> Option<&ProviderPolicy> {
        self.providers.get(provider.as_str())
    }

    /// # Errors
    ///
    /// `InvalidConfig` naming the first problem found: empty version, no or
    /// unknown providers, empty/floating/duplicate model names, zero
    /// ceilings or timeout, or a forbidden field that is also a request field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| {
            Err(GovError::new(GovErrorKind::InvalidConfig)
                .with_op("policy_validate")
                .with_message(msg))
        };

        if self.version.trim().is_empty() {
            return invalid("version must be non-empty".to_string());
        }
        if self.providers.is_empty() {
            return invalid("at least one provider must be configured".to_string());
        }
        for (name, policy) in &self.providers {
            if Provider::parse(name).is_none() {
                return invalid(format!("unknown provider '{}'", name));
            }
            if policy.max_output_tokens == 0 {
                return invalid(format!("{}: max_output_tokens must be > 0", name));
            }
            if policy.allowed_models.is_empty() {
                return invalid(format!("{}: allowed_models must be non-empty", name));
            }
            let mut seen = BTreeSet::new();
            for model in &policy.allowed_models {
                if is_floating_tag(model) {
                    return invalid(format!("{}: model '{}' is not a pinned name", name, model));
                }
                if !seen.insert(model.as_str()) {
                    return invalid(format!("{}: duplicate model '{}'", name, model));
                }
            }
        }
        for field in &self.forbidden_fields {
            if CANDIDATE_FIELDS.contains(&field.as_str()) {
                return invalid(format!("forbidden field '{}' is a request field", field));
            }
        }
        if self.provider_timeout_ms == 0 {
            return invalid("provider_timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}

/// Names that do not pin a single model version
pub fn is_floating_tag(model: &str) -> bool {
    let m = model.trim();
    m.is_empty()
        || m != model
        || m.eq_ignore_ascii_case("latest")
        || m.eq_ignore_ascii_case("default")
        || m.eq_ignore_ascii_case("auto")
        || m.ends_with("-latest")
        || m.ends_with(":latest")
        || m.contains('*')
}
