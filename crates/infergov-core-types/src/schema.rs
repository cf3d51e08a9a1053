//! Canonical schema constants for structured logging
//!
//! These constants keep event field names identical across crates.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_SPAN_ID: &str = "span_id";

// Artifact identifiers
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_ARTIFACT_ID: &str = "artifact_id";
pub const FIELD_ARTIFACT_KIND: &str = "artifact_kind";
pub const FIELD_RECEIPT_ID: &str = "receipt_id";

// Outcomes
pub const FIELD_STATUS: &str = "status";
pub const FIELD_REASON: &str = "reason";
pub const FIELD_WRITE_OUTCOME: &str = "write_outcome";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_identifier_fields_are_distinct() {
        let fields = [
            FIELD_REQUEST_ID,
            FIELD_ARTIFACT_ID,
            FIELD_RECEIPT_ID,
            FIELD_TRACE_ID,
        ];
        for (i, a) in fields.iter().enumerate() {
            for b in &fields[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
