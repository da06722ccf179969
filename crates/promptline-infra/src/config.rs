//! Environment-based configuration.
//!
//! Each provider is configured independently; a missing API key means the
//! provider is simply not registered. Selecting an unconfigured provider is
//! reported at first use, not at startup.
//!
//! Variables:
//!
//! - `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`: credentials
//! - `PROMPTLINE_OPENAI_MODEL` / `PROMPTLINE_ANTHROPIC_MODEL`: model override
//! - `PROMPTLINE_OPENAI_BASE_URL` / `PROMPTLINE_ANTHROPIC_BASE_URL`: endpoint
//!   override (proxies, local test servers)
//! - `PROMPTLINE_TIMEOUT_SECS`: per-request HTTP timeout, shared by all
//!   providers

use secrecy::SecretString;

use promptline_core::llm::box_provider::BoxLlmProvider;
use promptline_core::llm::registry::ProviderRegistry;
use promptline_types::llm::ProviderKind;
use promptline_types::settings::ProviderSettings;

use crate::llm::anthropic::AnthropicProvider;
use crate::llm::openai::OpenAiProvider;

/// Environment variable names for a provider.
fn env_names(kind: ProviderKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        ProviderKind::OpenAi => (
            "OPENAI_API_KEY",
            "PROMPTLINE_OPENAI_MODEL",
            "PROMPTLINE_OPENAI_BASE_URL",
        ),
        ProviderKind::Anthropic => (
            "ANTHROPIC_API_KEY",
            "PROMPTLINE_ANTHROPIC_MODEL",
            "PROMPTLINE_ANTHROPIC_BASE_URL",
        ),
    }
}

const TIMEOUT_VAR: &str = "PROMPTLINE_TIMEOUT_SECS";

/// Resolve settings for one provider through an arbitrary variable lookup.
///
/// Returns `None` when the API key variable is unset or blank. A timeout
/// value that does not parse as a positive integer is ignored with a
/// warning; a bad optional override never blocks startup.
pub fn settings_from_lookup<F>(kind: ProviderKind, lookup: F) -> Option<ProviderSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let (key_var, model_var, base_url_var) = env_names(kind);

    let api_key = lookup(key_var)?;
    if api_key.trim().is_empty() {
        return None;
    }

    let mut settings = ProviderSettings::new(kind, SecretString::from(api_key));

    if let Some(model) = lookup(model_var).filter(|m| !m.trim().is_empty()) {
        settings = settings.with_model(model);
    }
    if let Some(base_url) = lookup(base_url_var).filter(|u| !u.trim().is_empty()) {
        settings = settings.with_base_url(base_url.trim_end_matches('/'));
    }
    if let Some(raw) = lookup(TIMEOUT_VAR) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => settings = settings.with_timeout_secs(secs),
            _ => {
                tracing::warn!(value = %raw, "ignoring unparseable {TIMEOUT_VAR}");
            }
        }
    }

    Some(settings)
}

/// Resolve settings for one provider from the process environment.
pub fn settings_from_env(kind: ProviderKind) -> Option<ProviderSettings> {
    settings_from_lookup(kind, |name| std::env::var(name).ok())
}

/// Build a registry containing every provider with a configured credential.
///
/// An empty registry is valid; each dispatch then fails with a
/// `Configuration` error naming the missing variable.
pub fn build_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    for kind in ProviderKind::ALL {
        match settings_from_env(kind) {
            Some(settings) => {
                tracing::debug!(provider = %kind, model = %settings.model, "provider configured");
                let provider = match kind {
                    ProviderKind::OpenAi => BoxLlmProvider::new(OpenAiProvider::new(settings)),
                    ProviderKind::Anthropic => {
                        BoxLlmProvider::new(AnthropicProvider::new(settings))
                    }
                };
                registry.register(kind, provider);
            }
            None => {
                tracing::debug!(provider = %kind, "provider not configured, skipping");
            }
        }
    }

    registry
}
