#![allow(clippy::unwrap_used, clippy::expect_used)]

// Boundary events for submissions and replay; prompt text never reaches
// the log stream.

mod common;

use common::{candidate, harness, Behaviour, FakeInvoker, USER_INPUT};
use infergov_core::invoker::ProviderFailureKind;
use infergov_core::logging_facility::test_capture::init_test_capture;
use infergov_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use infergov_core_types::{RequestContext, TraceId};

#[tokio::test]
async fn test_submit_emits_start_and_end() {
    let capture = init_test_capture();
    let h = harness(FakeInvoker::replying("logged reply"));

    let submission = h.pipeline.submit(&candidate()).await.unwrap();
    let receipt_id = submission.receipt().unwrap().receipt_id().to_string();

    let ends: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some("submit")
                && e.event.as_deref() == Some(EVENT_END)
                && e.field("receipt_id") == Some(receipt_id.as_str())
        })
        .collect();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("status"), Some("success"));
    assert!(ends[0].field("duration_ms").is_some());
    capture.assert_event_exists("submit", EVENT_START);
    capture.assert_event_exists("receipt_bind", EVENT_END);
}

#[tokio::test]
async fn test_prompt_and_provider_message_never_logged() {
    let capture = init_test_capture();
    let h = harness(FakeInvoker::new(Behaviour::Fail(
        ProviderFailureKind::Error,
        format!("upstream rejected input: {}", USER_INPUT),
    )));

    h.pipeline
        .submit_in(
            &RequestContext::with_trace_id(TraceId::from_string("trace-no-leak".to_string()))
                .with_caller("pipeline_logging_tests"),
            &candidate(),
        )
        .await
        .unwrap();

    capture.assert_no_field_contains(USER_INPUT);
    capture.assert_no_field_contains("upstream rejected input");
}

#[tokio::test]
async fn test_replay_logs_verdict_label() {
    let capture = init_test_capture();
    let h = harness(FakeInvoker::replying("ok"));
    let receipt_id = "absent-for-logging--receipt";

    h.pipeline.replay(receipt_id).unwrap();

    let ends: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some("replay_verify")
                && e.event.as_deref() == Some(EVENT_END)
                && e.field("receipt_id") == Some(receipt_id)
        })
        .collect();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("status"), Some("missing_artifact"));
    assert!(capture
        .events()
        .iter()
        .all(|e| !(e.op.as_deref() == Some("replay_verify")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field("receipt_id") == Some(receipt_id))));
}
