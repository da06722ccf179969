//! Per-provider settings.
//!
//! Resolved once from the environment at startup and read-only for the
//! process lifetime. The API key is wrapped in [`secrecy::SecretString`]
//! so it never appears in Debug output or logs.

use secrecy::SecretString;

use crate::llm::ProviderKind;

/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Credentials and endpoint settings for a single provider.
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Vendor API key. Never logged; only exposed when building request
    /// headers.
    pub api_key: SecretString,
    /// Default model for this provider.
    pub model: String,
    /// Override the vendor's default base URL (testing, proxies).
    pub base_url: Option<String>,
    /// Per-request HTTP timeout. A timed-out call surfaces as a transient
    /// failure for retry accounting.
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Create settings with the provider's default model and timeout.
    pub fn new(kind: ProviderKind, api_key: SecretString) -> Self {
        Self {
            kind,
            api_key,
            model: default_model(kind).to_string(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Default model identifier for each provider.
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "gpt-4o",
        ProviderKind::Anthropic => "claude-sonnet-4-20250514",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_provider_default_model() {
        let settings = ProviderSettings::new(
            ProviderKind::OpenAi,
            SecretString::from("test-key-not-real"),
        );
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(settings.base_url.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let settings = ProviderSettings::new(
            ProviderKind::Anthropic,
            SecretString::from("test-key-not-real"),
        )
        .with_model("claude-haiku-3-5-20250514")
        .with_base_url("http://localhost:8080")
        .with_timeout_secs(10);
        assert_eq!(settings.model, "claude-haiku-3-5-20250514");
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(settings.timeout_secs, 10);
    }

    #[test]
    fn test_default_models_cover_all_kinds() {
        for kind in ProviderKind::ALL {
            assert!(!default_model(kind).is_empty());
        }
    }
}
