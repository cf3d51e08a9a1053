//! Provider invocation boundary
//!
//! The only place in the pipeline allowed to block. Implementations live
//! outside this workspace; the pipeline calls one only after a request has
//! passed the gate and snapshot binding.

use async_trait::async_trait;
use infergov_core_types::Sensitive;

use crate::model::{ErrorType, InferenceRequest, Provider, TokenUsage};

/// Everything a provider adapter needs, with prompt text redacted from Debug
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub request_id: String,
    pub provider: Provider,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub system_prompt: Option<Sensitive<String>>,
    pub user_input: Sensitive<String>,
}

impl ProviderCall {
    pub fn from_request(request: &InferenceRequest) -> Self {
        let body = &request.body;
        Self {
            request_id: request.request_id.clone(),
            provider: body.provider,
            model: body.model.clone(),
            temperature: body.params.temperature,
            max_output_tokens: body.params.max_output_tokens,
            system_prompt: body.prompts.system_prompt.clone().map(Sensitive::new),
            user_input: Sensitive::new(body.prompts.user_input.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOutput {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailureKind {
    Unavailable,
    Timeout,
    RateLimited,
    AuthFailed,
    Error,
}

impl ProviderFailureKind {
    pub fn error_type(&self) -> ErrorType {
        match self {
            ProviderFailureKind::Unavailable => ErrorType::ProviderUnavailable,
            ProviderFailureKind::Timeout => ErrorType::ProviderTimeout,
            ProviderFailureKind::RateLimited => ErrorType::ProviderRateLimited,
            ProviderFailureKind::AuthFailed => ErrorType::ProviderAuthFailed,
            ProviderFailureKind::Error => ErrorType::ProviderError,
        }
    }
}

/// Failure reported by an adapter
///
/// `message` is raw provider text and is scrubbed before it reaches an
/// artifact.
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    pub kind: ProviderFailureKind,
    pub message: Sensitive<String>,
}

impl ProviderFailure {
    pub fn new(kind: ProviderFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Sensitive::new(message.into()),
        }
    }
}

#[async_trait]
pub trait ProviderInvoker: Send + Sync {
    async fn call(&self, call: ProviderCall) -> Result<ProviderOutput, ProviderFailure>;
}
