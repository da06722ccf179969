//! LLM provider abstractions for Promptline.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: object-safe wrapper for runtime provider selection
//! - `ProviderRegistry`: kind-indexed provider lookup
//! - `Dispatcher` + `RetryPolicy`: bounded retry with backoff and explicit
//!   fallback

pub mod box_provider;
pub mod dispatcher;
pub mod provider;
pub mod registry;
pub mod retry;
