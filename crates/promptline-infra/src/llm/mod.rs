//! LLM provider adapters.

pub mod anthropic;
pub mod openai;
