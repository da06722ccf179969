//! Call dispatcher: provider selection, bounded retry, explicit fallback.
//!
//! Resolves the requested provider from the registry, invokes it with up to
//! `max_attempts` attempts (transient and rate-limited failures only,
//! exponential backoff between attempts), and raises the last classified
//! error when retries exhaust. A fallback provider is engaged only when one
//! was configured explicitly, and only after the primary exhausts its retry
//! budget on a retryable error.

use promptline_types::error::LlmError;
use promptline_types::llm::{
    CompletionRequest, CompletionResponse, Message, ProviderKind, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};

use super::box_provider::BoxLlmProvider;
use super::registry::ProviderRegistry;
use super::retry::RetryPolicy;

/// Per-call parameter overrides.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Model override; `None` uses the provider's configured default.
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Routes completion requests to a registered provider with bounded retry.
pub struct Dispatcher {
    registry: ProviderRegistry,
    policy: RetryPolicy,
    /// Explicitly configured fallback provider. Never engaged silently.
    fallback: Option<ProviderKind>,
}

impl Dispatcher {
    /// Create a dispatcher over a registry with the default retry policy.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            policy: RetryPolicy::default(),
            fallback: None,
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configure an explicit fallback provider, tried once (with its own
    /// retry budget) after the primary exhausts retries on a retryable
    /// error.
    pub fn with_fallback(mut self, kind: ProviderKind) -> Self {
        self.fallback = Some(kind);
        self
    }

    /// The underlying registry (for listing configured providers).
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Send a bare prompt to the given provider and return the answer text.
    pub async fn call(
        &self,
        prompt: &str,
        provider: ProviderKind,
        options: CallOptions,
    ) -> Result<String, LlmError> {
        let request = Self::build_request(provider, vec![Message::user(prompt)], options);
        Ok(self.dispatch(&request).await?.text)
    }

    /// Send a full conversation history to the given provider and return the
    /// answer text. Message order and role labels pass through unmodified.
    pub async fn call_with_history(
        &self,
        messages: Vec<Message>,
        provider: ProviderKind,
        options: CallOptions,
    ) -> Result<String, LlmError> {
        let request = Self::build_request(provider, messages, options);
        Ok(self.dispatch(&request).await?.text)
    }

    /// Full-response variant used by the provider comparison view.
    pub async fn dispatch(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let primary = self.resolve(request.provider)?;

        match self.try_provider(primary, request).await {
            Ok(response) => Ok(response),
            Err(err) if err.is_retryable() => {
                let Some(fallback_kind) = self.fallback else {
                    return Err(err);
                };
                if fallback_kind == request.provider {
                    return Err(err);
                }
                let Some(fallback) = self.registry.get(fallback_kind) else {
                    // Fallback named but not configured: surface the
                    // primary's error, which is the more useful one.
                    return Err(err);
                };

                tracing::warn!(
                    primary = %request.provider,
                    fallback = %fallback_kind,
                    error = %err,
                    "primary exhausted retries, switching to fallback provider"
                );

                let mut fallback_request = request.clone();
                fallback_request.provider = fallback_kind;
                self.try_provider(fallback, &fallback_request).await
            }
            Err(err) => Err(err),
        }
    }

    fn build_request(
        provider: ProviderKind,
        messages: Vec<Message>,
        options: CallOptions,
    ) -> CompletionRequest {
        let mut request = CompletionRequest::with_history(provider, messages)
            .temperature(options.temperature)
            .max_tokens(options.max_tokens);
        request.model = options.model;
        request
    }

    fn resolve(&self, kind: ProviderKind) -> Result<&BoxLlmProvider, LlmError> {
        self.registry.get(kind).ok_or_else(|| {
            LlmError::Configuration(format!(
                "provider '{kind}' has no credential configured (set the \
                 {} environment variable)",
                credential_hint(kind)
            ))
        })
    }

    /// Run the bounded retry loop against one provider.
    async fn try_provider(
        &self,
        provider: &BoxLlmProvider,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let mut attempt: u32 = 1;

        loop {
            match provider.complete(request).await {
                Ok(response) => {
                    tracing::debug!(
                        provider = provider.name(),
                        attempt,
                        "completion succeeded"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    if !err.is_retryable() || !self.policy.should_retry(attempt) {
                        tracing::debug!(
                            provider = provider.name(),
                            attempt,
                            classification = err.classification(),
                            "completion failed, not retrying"
                        );
                        return Err(err);
                    }

                    let delay = self.policy.delay_for(attempt, err.retry_after_ms());
                    tracing::warn!(
                        provider = provider.name(),
                        attempt,
                        classification = err.classification(),
                        delay_ms = delay.as_millis() as u64,
                        "completion failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Environment variable holding the credential for a provider.
fn credential_hint(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "OPENAI_API_KEY",
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmProvider;
    use promptline_types::llm::{MessageRole, ProviderLimits};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    // --- Mock provider ---

    /// One scripted outcome per attempt; the last entry repeats.
    #[derive(Clone)]
    enum Step {
        Answer(&'static str),
        Transient,
        RateLimited(Option<u64>),
        Auth,
        Malformed,
    }

    struct MockProvider {
        kind: ProviderKind,
        limits: ProviderLimits,
        script: Mutex<Vec<Step>>,
        attempts: Arc<AtomicU32>,
        last_request: Arc<Mutex<Option<CompletionRequest>>>,
    }

    impl MockProvider {
        fn new(kind: ProviderKind, script: Vec<Step>) -> (Self, Arc<AtomicU32>) {
            let attempts = Arc::new(AtomicU32::new(0));
            let provider = Self {
                kind,
                limits: ProviderLimits {
                    max_temperature: 2.0,
                    max_output_tokens: 4096,
                },
                script: Mutex::new(script),
                attempts: attempts.clone(),
                last_request: Arc::new(Mutex::new(None)),
            };
            (provider, attempts)
        }

        fn request_recorder(&self) -> Arc<Mutex<Option<CompletionRequest>>> {
            self.last_request.clone()
        }
    }

    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            match self.kind {
                ProviderKind::OpenAi => "openai",
                ProviderKind::Anthropic => "anthropic",
            }
        }

        fn limits(&self) -> &ProviderLimits {
            &self.limits
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());

            let step = {
                let mut script = self.script.lock().unwrap();
                if script.len() > 1 {
                    script.remove(0)
                } else {
                    script[0].clone()
                }
            };

            match step {
                Step::Answer(text) => Ok(CompletionResponse {
                    text: text.to_string(),
                    provider: self.kind,
                    model: "mock-model".to_string(),
                    usage: None,
                }),
                Step::Transient => Err(LlmError::Transient("connection reset".into())),
                Step::RateLimited(hint) => Err(LlmError::RateLimited {
                    retry_after_ms: hint,
                }),
                Step::Auth => Err(LlmError::Authentication),
                Step::Malformed => Err(LlmError::Malformed("no content".into())),
            }
        }
    }

    fn dispatcher_with(kind: ProviderKind, script: Vec<Step>) -> (Dispatcher, Arc<AtomicU32>) {
        let (provider, attempts) = MockProvider::new(kind, script);
        let mut registry = ProviderRegistry::new();
        registry.register(kind, BoxLlmProvider::new(provider));
        (Dispatcher::new(registry), attempts)
    }

    // --- Retry accounting ---

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let (dispatcher, attempts) =
            dispatcher_with(ProviderKind::OpenAi, vec![Step::Answer("4")]);

        let answer = dispatcher
            .call("What is 2+2?", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap();

        assert_eq!(answer, "4");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_twice_then_success() {
        let (dispatcher, attempts) = dispatcher_with(
            ProviderKind::OpenAi,
            vec![Step::Transient, Step::Transient, Step::Answer("4")],
        );

        let answer = dispatcher
            .call("What is 2+2?", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap();

        assert_eq!(answer, "4");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_not_retried() {
        let (dispatcher, attempts) = dispatcher_with(ProviderKind::OpenAi, vec![Step::Auth]);

        let err = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Authentication));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_not_retried() {
        let (dispatcher, attempts) = dispatcher_with(ProviderKind::OpenAi, vec![Step::Malformed]);

        let err = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Malformed(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_rate_limit_exhausts_configured_attempts() {
        let (dispatcher, attempts) =
            dispatcher_with(ProviderKind::OpenAi, vec![Step::RateLimited(Some(100))]);

        let err = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RateLimited { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_transient_surfaces_last_error() {
        let (dispatcher, attempts) =
            dispatcher_with(ProviderKind::OpenAi, vec![Step::Transient]);

        let err = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_attempt_limit() {
        let (provider, attempts) = MockProvider::new(ProviderKind::OpenAi, vec![Step::Transient]);
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, BoxLlmProvider::new(provider));
        let dispatcher = Dispatcher::new(registry).with_policy(RetryPolicy {
            max_attempts: 5,
            ..Default::default()
        });

        let result = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }

    // --- Provider resolution ---

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_provider_fails_closed_with_zero_attempts() {
        let (dispatcher, attempts) =
            dispatcher_with(ProviderKind::OpenAi, vec![Step::Answer("4")]);

        let err = dispatcher
            .call("hi", ProviderKind::Anthropic, CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Configuration(_)));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    // --- History pass-through ---

    #[tokio::test(start_paused = true)]
    async fn test_history_order_and_roles_pass_through() {
        let (provider, _) = MockProvider::new(ProviderKind::Anthropic, vec![Step::Answer("ok")]);
        let recorder = provider.request_recorder();
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::Anthropic, BoxLlmProvider::new(provider));
        let dispatcher = Dispatcher::new(registry);

        let history = vec![
            Message::system("You are a helpful assistant."),
            Message::user("What is Rust?"),
            Message::assistant("A systems programming language."),
            Message::user("What are its main uses?"),
        ];

        dispatcher
            .call_with_history(history.clone(), ProviderKind::Anthropic, CallOptions::default())
            .await
            .unwrap();

        let seen = recorder.lock().unwrap().clone().unwrap();
        assert_eq!(seen.messages.len(), 4);
        let roles: Vec<MessageRole> = seen.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
        assert_eq!(seen.messages[3].content, "What are its main uses?");
    }

    #[tokio::test(start_paused = true)]
    async fn test_options_flow_into_request() {
        let (provider, _) = MockProvider::new(ProviderKind::OpenAi, vec![Step::Answer("ok")]);
        let recorder = provider.request_recorder();
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, BoxLlmProvider::new(provider));
        let dispatcher = Dispatcher::new(registry);

        let options = CallOptions {
            model: Some("gpt-4o-mini".to_string()),
            temperature: 0.1,
            max_tokens: 256,
        };
        dispatcher
            .call("hi", ProviderKind::OpenAi, options)
            .await
            .unwrap();

        let seen = recorder.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model.as_deref(), Some("gpt-4o-mini"));
        assert!((seen.temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(seen.max_tokens, 256);
    }

    // --- Fallback ---

    #[tokio::test(start_paused = true)]
    async fn test_fallback_engaged_after_primary_exhausts() {
        let (primary, primary_attempts) =
            MockProvider::new(ProviderKind::OpenAi, vec![Step::Transient]);
        let (fallback, fallback_attempts) =
            MockProvider::new(ProviderKind::Anthropic, vec![Step::Answer("from fallback")]);

        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, BoxLlmProvider::new(primary));
        registry.register(ProviderKind::Anthropic, BoxLlmProvider::new(fallback));
        let dispatcher = Dispatcher::new(registry).with_fallback(ProviderKind::Anthropic);

        let answer = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap();

        assert_eq!(answer, "from fallback");
        assert_eq!(primary_attempts.load(Ordering::SeqCst), 3);
        assert_eq!(fallback_attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_not_engaged_for_auth_error() {
        let (primary, _) = MockProvider::new(ProviderKind::OpenAi, vec![Step::Auth]);
        let (fallback, fallback_attempts) =
            MockProvider::new(ProviderKind::Anthropic, vec![Step::Answer("nope")]);

        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, BoxLlmProvider::new(primary));
        registry.register(ProviderKind::Anthropic, BoxLlmProvider::new(fallback));
        let dispatcher = Dispatcher::new(registry).with_fallback(ProviderKind::Anthropic);

        let err = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Authentication));
        assert_eq!(fallback_attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fallback_without_explicit_configuration() {
        let (primary, _) = MockProvider::new(ProviderKind::OpenAi, vec![Step::Transient]);
        let (other, other_attempts) =
            MockProvider::new(ProviderKind::Anthropic, vec![Step::Answer("nope")]);

        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, BoxLlmProvider::new(primary));
        registry.register(ProviderKind::Anthropic, BoxLlmProvider::new(other));
        // No with_fallback: the registered second provider must stay idle.
        let dispatcher = Dispatcher::new(registry);

        let err = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Transient(_)));
        assert_eq!(other_attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_same_as_primary_is_not_reattempted() {
        let (primary, attempts) = MockProvider::new(ProviderKind::OpenAi, vec![Step::Transient]);
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, BoxLlmProvider::new(primary));
        let dispatcher = Dispatcher::new(registry).with_fallback(ProviderKind::OpenAi);

        let result = dispatcher
            .call("hi", ProviderKind::OpenAi, CallOptions::default())
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
