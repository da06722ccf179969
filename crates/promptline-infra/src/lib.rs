//! Infrastructure implementations for Promptline.
//!
//! Concrete [`promptline_core::llm::provider::LlmProvider`] adapters for the
//! Anthropic Messages API and the OpenAI chat completions API, plus the
//! environment-based configuration that decides which providers are
//! registered at startup.

pub mod config;
pub mod llm;
