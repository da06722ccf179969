//! Error taxonomy for LLM calls.
//!
//! Every failure a provider or the dispatcher can produce is one of these
//! variants. The retry loop keys off [`LlmError::is_retryable`]; the CLI
//! surfaces [`LlmError::classification`] alongside the human-readable
//! message. A failure is never converted into an empty success response.

/// Classified failure from a provider call or the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Missing or invalid local provider setup (e.g., the selected provider
    /// has no credential configured). Fatal, never retried.
    #[error("provider not configured: {0}")]
    Configuration(String),

    /// Bad request shape (empty prompt, out-of-range temperature or token
    /// cap). Raised before any network call. Fatal, never retried.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Credential rejected by the vendor at runtime. Distinct from
    /// [`LlmError::Configuration`]: the key was present but refused.
    /// Fatal, never retried.
    #[error("authentication rejected by provider")]
    Authentication,

    /// Temporary network or service condition (timeout, connection reset,
    /// 5xx). Safe to retry with backoff.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Vendor backpressure signal. Retried with backoff, honoring the
    /// vendor-supplied retry hint when present.
    #[error("rate limited (retry after {retry_after_ms:?} ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Unparsable or empty vendor response. Fatal, not retried; carries the
    /// diagnostic detail.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Whether the dispatcher may retry this failure.
    ///
    /// Only transient and rate-limited failures qualify; everything else
    /// propagates after exactly one send attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Transient(_) | LlmError::RateLimited { .. })
    }

    /// Internal classification tag surfaced next to the human-readable
    /// message.
    pub fn classification(&self) -> &'static str {
        match self {
            LlmError::Configuration(_) => "configuration",
            LlmError::InvalidParameter(_) => "invalid_parameter",
            LlmError::Authentication => "authentication",
            LlmError::Transient(_) => "transient",
            LlmError::RateLimited { .. } => "rate_limited",
            LlmError::Malformed(_) => "malformed",
        }
    }

    /// Vendor-supplied retry hint, if this is a rate-limit failure.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            LlmError::RateLimited { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }
}
