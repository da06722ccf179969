//! Business logic for Promptline.
//!
//! Two halves:
//! - `llm`: the provider abstraction (`LlmProvider`, `BoxLlmProvider`),
//!   the provider registry, and the `Dispatcher` with bounded retry and
//!   explicit fallback.
//! - `flow`: the three-step (prep/exec/post) Q&A node and loop glue.

pub mod flow;
pub mod llm;
