//! Three-step (prep/exec/post) Q&A flow glue.
//!
//! The flow has exactly two states: Awaiting-Question and Processing,
//! looping until the quit sentinel. Context is passed explicitly between
//! stages; there is no process-wide mutable store.

pub mod node;
pub mod qa;

pub use node::{Node, Transition};
pub use qa::{QaContext, QaFlow, QaNode, QuestionSource, QUIT_SENTINEL};
