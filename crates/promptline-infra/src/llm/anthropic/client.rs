//! AnthropicProvider -- concrete [`LlmProvider`] implementation for the
//! Anthropic Messages API.
//!
//! Sends requests to `/v1/messages` with the `x-api-key` and
//! `anthropic-version` headers. The API key is wrapped in
//! [`secrecy::SecretString`] and is never logged or included in Debug
//! output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use promptline_core::llm::provider::{validate_request, LlmProvider};
use promptline_types::error::LlmError;
use promptline_types::llm::{
    CompletionRequest, CompletionResponse, MessageRole, ProviderKind, ProviderLimits, Usage,
};
use promptline_types::settings::ProviderSettings;

use super::types::{AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse};

/// Parameter ranges accepted by the Messages API.
const ANTHROPIC_LIMITS: ProviderLimits = ProviderLimits {
    max_temperature: 1.0,
    max_output_tokens: 8_192,
};

/// Anthropic Claude LLM provider.
///
/// Does NOT derive Debug: the `SecretString` field already shields the key,
/// and omitting Debug entirely keeps the rest of the state out of logs too.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";

    /// Create a provider from resolved settings.
    pub fn new(settings: ProviderSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key: settings.api_key,
            base_url: settings
                .base_url
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            model: settings.model,
        }
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a generic [`CompletionRequest`] into an [`AnthropicRequest`].
    ///
    /// System-role messages are lifted into the top-level `system` field;
    /// the relative order of user/assistant messages is untouched.
    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut messages = Vec::new();

        for msg in &request.messages {
            match msg.role {
                MessageRole::System => system_parts.push(&msg.content),
                MessageRole::User | MessageRole::Assistant => messages.push(AnthropicMessage {
                    role: msg.role.to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        AnthropicRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            max_tokens: request.max_tokens,
            messages,
            system: if system_parts.is_empty() {
                None
            } else {
                Some(system_parts.join("\n\n"))
            },
            temperature: request.temperature,
        }
    }
}

/// Classify a non-success HTTP status into the error taxonomy.
fn classify_status(status: u16, retry_after_ms: Option<u64>, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::Authentication,
        429 => LlmError::RateLimited { retry_after_ms },
        400 => LlmError::InvalidParameter(body),
        408 | 500..=599 => LlmError::Transient(format!("HTTP {status}: {body}")),
        _ => LlmError::Transient(format!("unexpected HTTP {status}: {body}")),
    }
}

/// Parse the vendor `retry-after` header (integer seconds) into milliseconds.
fn retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1000)
}

/// Extract the answer text from a parsed response.
///
/// An empty concatenation of text blocks is a malformed response: a failure
/// is never turned into an empty success.
fn extract_text(response: &AnthropicResponse) -> Result<String, LlmError> {
    let text = response
        .content
        .iter()
        .filter_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text.as_str()),
            AnthropicContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(LlmError::Malformed(
            "response contained no text content blocks".into(),
        ));
    }
    Ok(text)
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn limits(&self) -> &ProviderLimits {
        &ANTHROPIC_LIMITS
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        validate_request(request, self.limits())?;

        let body = self.to_anthropic_request(request);
        let url = self.url("/v1/messages");
        tracing::debug!(model = %body.model, messages = body.messages.len(), "calling anthropic");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let hint = retry_after_ms(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), hint, error_body));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(format!("failed to parse response: {e}")))?;

        let text = extract_text(&parsed)?;

        Ok(CompletionResponse {
            text,
            provider: ProviderKind::Anthropic,
            model: parsed.model,
            usage: Some(Usage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            }),
        })
    }
}
