//! LLM request/response types for Promptline.
//!
//! These types model the data shapes for provider interactions: conversation
//! messages, completion requests and responses, and the closed set of
//! supported providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Temperature applied when the caller does not specify one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Response token cap applied when the caller does not specify one.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// The closed set of supported LLM providers.
///
/// Selected explicitly by the caller; every dispatch path matches on this
/// enum exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// All supported providers, in display order.
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Anthropic];
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(format!("unknown provider: '{other}'")),
        }
    }
}

/// Request to an LLM provider for a completion.
///
/// Immutable once constructed: the dispatcher re-sends the same logical
/// request on every retry attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider this request is addressed to.
    pub provider: ProviderKind,
    /// Model override; `None` uses the provider's configured default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation messages, in order. Order is preserved all the way into
    /// the vendor-formatted request.
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build a single-turn request from a bare prompt.
    pub fn from_prompt(provider: ProviderKind, prompt: impl Into<String>) -> Self {
        Self {
            provider,
            model: None,
            messages: vec![Message::user(prompt)],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a request carrying full conversation history.
    pub fn with_history(provider: ProviderKind, messages: Vec<Message>) -> Self {
        Self {
            provider,
            model: None,
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token usage reported by the vendor for a completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Response from an LLM provider.
///
/// Owned solely by the caller; nothing here is shared mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,
    /// Provider that produced the response.
    pub provider: ProviderKind,
    /// Model that actually served the request, as reported by the vendor.
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Accepted parameter ranges for a provider.
///
/// Requests are validated against these before any network call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProviderLimits {
    /// Highest accepted sampling temperature (lower bound is always 0.0).
    pub max_temperature: f64,
    /// Largest accepted `max_tokens` value.
    pub max_output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::System, MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: MessageRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MessageRole::Assistant);
    }

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in ProviderKind::ALL {
            let s = kind.to_string();
            let parsed: ProviderKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_provider_kind_serde_names() {
        assert_eq!(serde_json::to_string(&ProviderKind::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(
            serde_json::to_string(&ProviderKind::Anthropic).unwrap(),
            "\"anthropic\""
        );
    }

    #[test]
    fn test_provider_kind_rejects_unknown() {
        let err = "cohere".parse::<ProviderKind>().unwrap_err();
        assert!(err.contains("cohere"));
    }

    #[test]
    fn test_from_prompt_defaults() {
        let req = CompletionRequest::from_prompt(ProviderKind::OpenAi, "What is 2+2?");
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, MessageRole::User);
        assert_eq!(req.messages[0].content, "What is 2+2?");
        assert!((req.temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);
        assert_eq!(req.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(req.model.is_none());
    }

    #[test]
    fn test_with_history_preserves_order() {
        let messages = vec![
            Message::system("You are a helpful assistant."),
            Message::user("What is Rust?"),
            Message::assistant("A systems programming language."),
            Message::user("What are its main uses?"),
        ];
        let req = CompletionRequest::with_history(ProviderKind::Anthropic, messages.clone());
        assert_eq!(req.messages.len(), 4);
        for (got, want) in req.messages.iter().zip(&messages) {
            assert_eq!(got.role, want.role);
            assert_eq!(got.content, want.content);
        }
    }

    #[test]
    fn test_request_builder_overrides() {
        let req = CompletionRequest::from_prompt(ProviderKind::OpenAi, "hi")
            .model("gpt-4o-mini")
            .temperature(0.2)
            .max_tokens(64);
        assert_eq!(req.model.as_deref(), Some("gpt-4o-mini"));
        assert!((req.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(req.max_tokens, 64);
    }
}
