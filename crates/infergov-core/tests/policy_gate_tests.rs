#![allow(clippy::unwrap_used, clippy::expect_used)]

// Policy Gate scenarios: ordering, fail-closed behaviour and reason strings.

use infergov_core::policy::{PolicyGate, PolicyMatrix, RejectReason, Verdict};
use infergov_core::{ErrorType, InferenceRequest, Provider};
use serde_json::{json, Value};

fn candidate() -> Value {
    json!({
        "created_at_utc": "2026-01-15T10:00:00Z",
        "work_order_id": "wo-1",
        "snapshot_hash": "a".repeat(64),
        "snapshot_artifact_id": "snap-1",
        "provider": "openai",
        "model": "gpt-4.1-mini",
        "temperature": 0.2,
        "max_output_tokens": 800,
        "system_prompt": null,
        "user_input": "Summarize the attached notes.",
        "input_artifact_ids": ["bundle-1"]
    })
}

fn with(field: &str, value: Value) -> Value {
    let mut c = candidate();
    c[field] = value;
    c
}

fn without(field: &str) -> Value {
    let mut c = candidate();
    c.as_object_mut().unwrap().remove(field);
    c
}

fn rejection_of(candidate: &Value) -> (ErrorType, RejectReason) {
    match PolicyGate::evaluate(candidate, &PolicyMatrix::baseline()) {
        Verdict::Accept(_) => panic!("expected rejection"),
        Verdict::Reject(r) => (r.error_type, r.reason),
    }
}

#[test]
fn test_accepts_valid_candidate() {
    let verdict = PolicyGate::evaluate(&candidate(), &PolicyMatrix::baseline());
    let body = verdict.into_result().unwrap();
    assert_eq!(body.provider, Provider::OpenAi);
    assert_eq!(body.params.max_output_tokens, 800);
    assert_eq!(body.prompts.system_prompt, None);
    assert_eq!(body.input_artifact_ids, vec!["bundle-1".to_string()]);
}

#[test]
fn test_floating_model_tag_is_policy_violation() {
    // Given a model that does not pin a version
    let c = with("model", json!("gpt-5-latest"));

    // Then the gate rejects with policy_violation
    let verdict = PolicyGate::evaluate(&c, &PolicyMatrix::baseline());
    let rejection = verdict.rejection().unwrap();
    assert_eq!(rejection.error_type, ErrorType::PolicyViolation);
    assert_eq!(
        rejection.reason_string(),
        "policy_violation:model_alias_forbidden"
    );
}

#[test]
fn test_model_not_on_allowlist() {
    assert_eq!(
        rejection_of(&with("model", json!("gpt-3.5-turbo"))),
        (ErrorType::PolicyViolation, RejectReason::ModelNotAllowlisted)
    );
    // allowlist is per provider
    assert_eq!(
        rejection_of(&with("model", json!("claude-3-haiku"))),
        (ErrorType::PolicyViolation, RejectReason::ModelNotAllowlisted)
    );
    assert_eq!(
        rejection_of(&with("model", json!(""))),
        (ErrorType::PolicyViolation, RejectReason::ModelAliasForbidden)
    );
}

#[test]
fn test_unknown_provider() {
    assert_eq!(
        rejection_of(&with("provider", json!("azure"))),
        (ErrorType::PolicyViolation, RejectReason::UnknownProvider)
    );
}

#[test]
fn test_provider_checked_before_model() {
    let mut c = with("provider", json!("cohere"));
    c["model"] = json!("latest");
    assert_eq!(
        rejection_of(&c).1,
        RejectReason::UnknownProvider,
        "first failing check decides the reason"
    );
}

#[test]
fn test_temperature_bounds_and_presence() {
    assert_eq!(
        rejection_of(&with("temperature", json!(1.5))),
        (ErrorType::PolicyViolation, RejectReason::TemperatureOutOfRange)
    );
    assert_eq!(
        rejection_of(&with("temperature", json!(-0.1))),
        (ErrorType::PolicyViolation, RejectReason::TemperatureOutOfRange)
    );
    assert_eq!(
        rejection_of(&without("temperature")),
        (ErrorType::SchemaInvalid, RejectReason::MissingField)
    );
    assert_eq!(
        rejection_of(&with("temperature", json!("0.2"))),
        (ErrorType::SchemaInvalid, RejectReason::WrongType)
    );
    // inclusive bounds
    assert!(PolicyGate::evaluate(&with("temperature", json!(0.0)), &PolicyMatrix::baseline()).is_accept());
    assert!(PolicyGate::evaluate(&with("temperature", json!(1.0)), &PolicyMatrix::baseline()).is_accept());
}

#[test]
fn test_max_output_tokens_bounds() {
    for bad in [json!(0), json!(-5), json!(4097), json!(u64::MAX)] {
        assert_eq!(
            rejection_of(&with("max_output_tokens", bad)),
            (ErrorType::PolicyViolation, RejectReason::MaxOutputTokensOutOfRange)
        );
    }
    assert_eq!(
        rejection_of(&with("max_output_tokens", json!(12.5))),
        (ErrorType::SchemaInvalid, RejectReason::WrongType)
    );
    assert!(
        PolicyGate::evaluate(&with("max_output_tokens", json!(4096)), &PolicyMatrix::baseline())
            .is_accept()
    );
}

#[test]
fn test_required_system_prompt() {
    let mut matrix = PolicyMatrix::baseline();
    matrix.require_system_prompt = true;

    let verdict = PolicyGate::evaluate(&candidate(), &matrix);
    assert_eq!(
        verdict.rejection().map(|r| r.reason),
        Some(RejectReason::SystemPromptRequired)
    );

    let blank = with("system_prompt", json!("   "));
    assert!(!PolicyGate::evaluate(&blank, &matrix).is_accept());

    let ok = with("system_prompt", json!("You are a careful analyst."));
    assert!(PolicyGate::evaluate(&ok, &matrix).is_accept());
}

#[test]
fn test_forbidden_override_field() {
    let c = with("provider_defaults", json!({"temperature": 0.9}));
    let verdict = PolicyGate::evaluate(&c, &PolicyMatrix::baseline());
    let rejection = verdict.rejection().unwrap();
    assert_eq!(rejection.reason, RejectReason::ForbiddenField);
    assert_eq!(rejection.field.as_deref(), Some("provider_defaults"));
}

#[test]
fn test_unknown_field_is_schema_invalid() {
    assert_eq!(
        rejection_of(&with("top_p", json!(0.9))),
        (ErrorType::SchemaInvalid, RejectReason::UnknownField)
    );
}

#[test]
fn test_every_missing_mandatory_field_rejects() {
    for field in [
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
    ] {
        let verdict = PolicyGate::evaluate(&without(field), &PolicyMatrix::baseline());
        assert!(!verdict.is_accept(), "missing {} must reject", field);
    }
}

#[test]
fn test_missing_snapshot_has_its_own_type() {
    assert_eq!(
        rejection_of(&without("snapshot_hash")).0,
        ErrorType::SnapshotMissing
    );
    assert_eq!(
        rejection_of(&with("snapshot_artifact_id", Value::Null)).0,
        ErrorType::SnapshotMissing
    );
    assert_eq!(
        rejection_of(&with("snapshot_hash", json!("not-a-hash"))),
        (ErrorType::SchemaInvalid, RejectReason::InvalidSnapshotHash)
    );
}

#[test]
fn test_envelope_checks() {
    assert_eq!(
        rejection_of(&json!(["not", "an", "object"])).1,
        RejectReason::NotAnObject
    );
    assert_eq!(
        rejection_of(&with("created_at_utc", json!("yesterday"))).1,
        RejectReason::InvalidTimestamp
    );
    assert_eq!(
        rejection_of(&with("user_input", json!("  "))).1,
        RejectReason::EmptyUserInput
    );
    assert_eq!(
        rejection_of(&with("input_artifact_ids", json!(["a", "a"]))).1,
        RejectReason::DuplicateInputArtifact
    );
    assert_eq!(
        rejection_of(&with("input_artifact_ids", json!(["../etc"]))).1,
        RejectReason::InvalidArtifactId
    );
}

#[test]
fn test_accepted_bodies_seal_deterministically() {
    let matrix = PolicyMatrix::baseline();
    let a = PolicyGate::evaluate(&candidate(), &matrix).into_result().unwrap();
    let b = PolicyGate::evaluate(&candidate(), &matrix).into_result().unwrap();
    assert_eq!(
        InferenceRequest::seal(a).unwrap().request_id,
        InferenceRequest::seal(b).unwrap().request_id
    );
}
