//! Correlation types for tracing a submission through the pipeline
//!
//! These ids live only in log events. They are never written into an
//! artifact, so two runs over identical input still produce identical bytes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh time-ordered id (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an id received from a caller
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifies one end-to-end pipeline attempt in the logs
    TraceId
);

correlation_id!(
    /// Identifies one stage (gate, binding, provider, emit, bind) within a trace
    SpanId
);

/// Context carried through one submission for log correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: TraceId,
    pub caller: Option<String>,
}

impl RequestContext {
    /// Create a new context with a fresh TraceId
    pub fn new() -> Self {
        Self {
            trace_id: TraceId::new(),
            caller: None,
        }
    }

    /// Create a context that continues an upstream trace
    pub fn with_trace_id(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            caller: None,
        }
    }

    /// Tag the context with the submitting component
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    /// Open a child span id for one stage of the attempt
    pub fn span(&self) -> SpanId {
        SpanId::new()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
