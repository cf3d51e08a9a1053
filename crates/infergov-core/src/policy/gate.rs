use serde_json::{Map, Value};
use std::collections::HashSet;

use super::matrix::is_floating_tag;
use super::{PolicyMatrix, RejectReason, Rejection, Verdict};
use crate::codec::is_sha256_hex;
use crate::model::{
    is_valid_artifact_id, ArtifactKind, ErrorType, Prompts, Provider, RequestBody, RequestParams,
};

/// Every field a candidate request may carry
pub const CANDIDATE_FIELDS: [&str; 11] = [
    "created_at_utc",
    "work_order_id",
    "snapshot_hash",
    "snapshot_artifact_id",
    "provider",
    "model",
    "temperature",
    "max_output_tokens",
    "system_prompt",
    "user_input",
    "input_artifact_ids",
];

/// Stateless checker turning a candidate JSON object into a [`RequestBody`]
///
/// Envelope checks run first (shape, mandatory fields, timestamps, ids).
/// The governance checks follow in fixed order and the first failure wins:
///
/// 1. provider is a known variant configured in the matrix
/// 2. model is pinned and allowlisted for that provider
/// 3. temperature explicitly supplied and within `[0.0, 1.0]`
/// 4. `0 < max_output_tokens <= ceiling`
/// 5. system prompt present when the matrix requires one
/// 6. no forbidden override fields
///
/// A field that is absent or of the wrong JSON type is `schema_invalid`.
/// A field that is present and well-typed but outside what policy allows
/// is `policy_violation`.
///
/// The gate never writes, hashes or calls out.
pub struct PolicyGate;

impl PolicyGate {
    pub fn evaluate(candidate: &Value, matrix: &PolicyMatrix) -> Verdict<RequestBody> {
        match Self::check(candidate, matrix) {
            Ok(body) => Verdict::Accept(body),
            Err(rejection) => Verdict::Reject(rejection),
        }
    }

    fn check(candidate: &Value, matrix: &PolicyMatrix) -> Result<RequestBody, Rejection> {
        let obj = candidate
            .as_object()
            .ok_or_else(|| Rejection::new(ErrorType::SchemaInvalid, RejectReason::NotAnObject))?;

        // ---- envelope ----
        if let Some(unknown) = obj.keys().find(|k| {
            !CANDIDATE_FIELDS.contains(&k.as_str()) && !matrix.forbidden_fields.contains(*k)
        }) {
            return Err(Rejection::schema(RejectReason::UnknownField, unknown));
        }

        let created_at_utc = required_str(obj, "created_at_utc")?;
        if chrono::DateTime::parse_from_rfc3339(created_at_utc).is_err() {
            return Err(Rejection::schema(
                RejectReason::InvalidTimestamp,
                "created_at_utc",
            ));
        }

        let snapshot_hash = snapshot_field(obj, "snapshot_hash")?;
        if !is_sha256_hex(snapshot_hash) {
            return Err(Rejection::schema(
                RejectReason::InvalidSnapshotHash,
                "snapshot_hash",
            ));
        }
        let snapshot_artifact_id = snapshot_field(obj, "snapshot_artifact_id")?;
        if !is_valid_artifact_id(snapshot_artifact_id) {
            return Err(Rejection::schema(
                RejectReason::InvalidArtifactId,
                "snapshot_artifact_id",
            ));
        }

        let work_order_id = match present(obj, "work_order_id")? {
            Value::Null => None,
            Value::String(s) if is_valid_artifact_id(s) => Some(s.clone()),
            Value::String(_) => {
                return Err(Rejection::schema(
                    RejectReason::InvalidArtifactId,
                    "work_order_id",
                ))
            }
            _ => return Err(Rejection::schema(RejectReason::WrongType, "work_order_id")),
        };

        let user_input = required_str(obj, "user_input")?;
        if user_input.trim().is_empty() {
            return Err(Rejection::schema(RejectReason::EmptyUserInput, "user_input"));
        }

        let input_artifact_ids = input_ids(obj)?;

        let system_prompt = match present(obj, "system_prompt")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            _ => return Err(Rejection::schema(RejectReason::WrongType, "system_prompt")),
        };

        // ---- 1. provider ----
        let provider_name = required_str(obj, "provider")?;
        let provider = Provider::parse(provider_name)
            .ok_or_else(|| Rejection::policy(RejectReason::UnknownProvider, "provider"))?;
        let provider_policy = matrix
            .for_provider(provider)
            .ok_or_else(|| Rejection::policy(RejectReason::ProviderNotConfigured, "provider"))?;

        // ---- 2. model ----
        let model = required_str(obj, "model")?;
        if is_floating_tag(model) {
            return Err(Rejection::policy(RejectReason::ModelAliasForbidden, "model"));
        }
        if !provider_policy.allowed_models.iter().any(|m| m == model) {
            return Err(Rejection::policy(RejectReason::ModelNotAllowlisted, "model"));
        }

        // ---- 3. temperature ----
        let temperature = required(obj, "temperature")?
            .as_f64()
            .ok_or_else(|| Rejection::schema(RejectReason::WrongType, "temperature"))?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(Rejection::policy(
                RejectReason::TemperatureOutOfRange,
                "temperature",
            ));
        }

        // ---- 4. max_output_tokens ----
        let raw_tokens = required(obj, "max_output_tokens")?;
        let tokens = match (raw_tokens.as_i64(), raw_tokens.as_u64()) {
            (Some(n), _) => i128::from(n),
            (None, Some(n)) => i128::from(n),
            (None, None) => {
                return Err(Rejection::schema(RejectReason::WrongType, "max_output_tokens"))
            }
        };
        let max_output_tokens = u32::try_from(tokens)
            .ok()
            .filter(|n| *n > 0 && *n <= provider_policy.max_output_tokens)
            .ok_or_else(|| {
                Rejection::policy(
                    RejectReason::MaxOutputTokensOutOfRange,
                    "max_output_tokens",
                )
            })?;

        // ---- 5. system prompt ----
        if matrix.require_system_prompt
            && system_prompt.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err(Rejection::policy(
                RejectReason::SystemPromptRequired,
                "system_prompt",
            ));
        }

        // ---- 6. forbidden override fields ----
        if let Some(field) = matrix
            .forbidden_fields
            .iter()
            .find(|f| obj.contains_key(f.as_str()))
        {
            return Err(Rejection::policy(RejectReason::ForbiddenField, field));
        }

        Ok(RequestBody {
            kind: ArtifactKind::Request,
            created_at_utc: created_at_utc.to_string(),
            work_order_id,
            snapshot_hash: snapshot_hash.to_string(),
            snapshot_artifact_id: snapshot_artifact_id.to_string(),
            provider,
            model: model.to_string(),
            params: RequestParams {
                temperature,
                max_output_tokens,
            },
            prompts: Prompts {
                system_prompt,
                user_input: user_input.to_string(),
            },
            input_artifact_ids,
        })
    }
}

/// Key must exist; `null` is allowed
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, Rejection> {
    obj.get(field)
        .ok_or_else(|| Rejection::schema(RejectReason::MissingField, field))
}

/// Key must exist and be non-null
fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, Rejection> {
    match present(obj, field)? {
        Value::Null => Err(Rejection::schema(RejectReason::MissingField, field)),
        v => Ok(v),
    }
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, Rejection> {
    required(obj, field)?
        .as_str()
        .ok_or_else(|| Rejection::schema(RejectReason::WrongType, field))
}

/// Snapshot fields get their own taxonomy entry when absent
fn snapshot_field<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, Rejection> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(Rejection::new(
            ErrorType::SnapshotMissing,
            RejectReason::SnapshotMissing,
        )
        .on_field(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Rejection::schema(RejectReason::WrongType, field)),
    }
}

fn input_ids(obj: &Map<String, Value>) -> Result<Vec<String>, Rejection> {
    const FIELD: &str = "input_artifact_ids";
    let items = required(obj, FIELD)?
        .as_array()
        .ok_or_else(|| Rejection::schema(RejectReason::WrongType, FIELD))?;

    let mut seen = HashSet::with_capacity(items.len());
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = item
            .as_str()
            .ok_or_else(|| Rejection::schema(RejectReason::WrongType, FIELD))?;
        if !is_valid_artifact_id(id) {
            return Err(Rejection::schema(RejectReason::InvalidArtifactId, FIELD));
        }
        if !seen.insert(id) {
            return Err(Rejection::schema(RejectReason::DuplicateInputArtifact, FIELD));
        }
        ids.push(id.to_string());
    }
    Ok(ids)
}
