//! LlmProvider trait definition.
//!
//! The core abstraction every provider adapter implements: authenticate,
//! format messages, invoke the endpoint, parse the response -- all behind
//! one `complete` call. Uses native async fn in traits (RPITIT); the
//! object-safe wrapper lives in [`super::box_provider`].

use promptline_types::error::LlmError;
use promptline_types::llm::{CompletionRequest, CompletionResponse, ProviderLimits};

/// Trait for LLM provider backends (OpenAI, Anthropic).
///
/// Contract: exactly one outbound network call per `complete` invocation,
/// no hidden batching. Transport failures come back classified
/// ([`LlmError::Transient`], [`LlmError::Authentication`],
/// [`LlmError::RateLimited`], [`LlmError::Malformed`]).
///
/// Implementations live in promptline-infra.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic", "openai").
    fn name(&self) -> &str;

    /// Accepted parameter ranges for this vendor.
    fn limits(&self) -> &ProviderLimits;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}

/// Validate a request against a provider's accepted ranges.
///
/// Adapters call this at the top of `complete`, before any network call.
/// Checks: at least one message, a non-empty prompt after trimming,
/// temperature within `[0, max_temperature]`, and a positive `max_tokens`
/// within the vendor cap.
pub fn validate_request(
    request: &CompletionRequest,
    limits: &ProviderLimits,
) -> Result<(), LlmError> {
    if request.messages.is_empty() {
        return Err(LlmError::InvalidParameter("messages must not be empty".into()));
    }

    let prompt_empty = request
        .messages
        .last()
        .is_none_or(|m| m.content.trim().is_empty());
    if prompt_empty {
        return Err(LlmError::InvalidParameter(
            "prompt must not be empty after trimming".into(),
        ));
    }

    if !request.temperature.is_finite()
        || request.temperature < 0.0
        || request.temperature > limits.max_temperature
    {
        return Err(LlmError::InvalidParameter(format!(
            "temperature {} outside accepted range 0..={}",
            request.temperature, limits.max_temperature
        )));
    }

    if request.max_tokens == 0 || request.max_tokens > limits.max_output_tokens {
        return Err(LlmError::InvalidParameter(format!(
            "max_tokens {} outside accepted range 1..={}",
            request.max_tokens, limits.max_output_tokens
        )));
    }

    Ok(())
}
