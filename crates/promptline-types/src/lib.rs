//! Shared domain types for Promptline.
//!
//! Pure data: conversation messages, completion requests/responses, the
//! provider enum, per-provider settings, and the error taxonomy. No I/O
//! lives here.

pub mod error;
pub mod llm;
pub mod settings;
