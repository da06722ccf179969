//! OpenAI LLM provider implementation.
//!
//! Uses [`async_openai`] for type-safe request/response handling against the
//! Chat Completions endpoint. The base URL is configurable so the same
//! provider also works against OpenAI-compatible proxies.

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use async_openai::Client;
use secrecy::ExposeSecret;

use promptline_core::llm::provider::{validate_request, LlmProvider};
use promptline_types::error::LlmError;
use promptline_types::llm::{
    CompletionRequest, CompletionResponse, MessageRole, ProviderKind, ProviderLimits, Usage,
};
use promptline_types::settings::ProviderSettings;

/// Parameter ranges accepted by the Chat Completions API.
const OPENAI_LIMITS: ProviderLimits = ProviderLimits {
    max_temperature: 2.0,
    max_output_tokens: 16_384,
};

/// OpenAI chat completion provider.
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`. Same defense-in-depth pattern
/// as [`super::anthropic::AnthropicProvider`].
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Create a provider from resolved settings.
    pub fn new(settings: ProviderSettings) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(settings.api_key.expose_secret());
        if let Some(ref base_url) = settings.base_url {
            config = config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(config),
            model: settings.model,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic
    /// [`CompletionRequest`]. All three roles map directly.
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::System => {
                    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        )),
                        refusal: None,
                        name: None,
                        audio: None,
                        tool_calls: None,
                        function_call: None,
                    })
                }
            })
            .collect();

        CreateChatCompletionRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature as f32),
            ..Default::default()
        }
    }
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn limits(&self) -> &ProviderLimits {
        &OPENAI_LIMITS
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        validate_request(request, self.limits())?;

        let oai_request = self.build_request(request);
        tracing::debug!(
            model = %oai_request.model,
            messages = oai_request.messages.len(),
            "calling openai"
        );

        // async-openai's Client has no per-request timeout knob, so the
        // deadline is enforced here. An elapsed deadline is a transient
        // failure for retry accounting.
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(oai_request))
            .await
            .map_err(|_| {
                LlmError::Transient(format!("request timed out after {:?}", self.timeout))
            })?
            .map_err(map_openai_error)?;

        let model = response.model.clone();
        let usage = response.usage.as_ref().map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::Malformed(
                "response contained no message content".into(),
            ));
        }

        Ok(CompletionResponse {
            text,
            provider: ProviderKind::OpenAi,
            model,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::Authentication
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if error_type == "invalid_request_error" {
                LlmError::InvalidParameter(api_err.message.clone())
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Transient(api_err.message.clone())
            } else {
                LlmError::Transient(err.to_string())
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 | 403 => LlmError::Authentication,
                    429 => LlmError::RateLimited {
                        retry_after_ms: None,
                    },
                    400 => LlmError::InvalidParameter(err.to_string()),
                    _ => LlmError::Transient(err.to_string()),
                }
            } else {
                LlmError::Transient(err.to_string())
            }
        }
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Malformed(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidParameter(msg.clone()),
        _ => LlmError::Transient(err.to_string()),
    }
}
