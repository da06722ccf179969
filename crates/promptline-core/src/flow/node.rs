//! The three-step node contract.

use promptline_types::error::LlmError;
use promptline_types::llm::Message;

use super::qa::QaContext;

/// Signal from `post` for what the loop does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Terminate,
}

/// Three-step pipeline stage contract: prep -> exec -> post.
///
/// `prep` obtains the next externally-supplied question (`None` terminates
/// the loop). `exec` is a pure function of its inputs: it must not touch the
/// context or any other shared mutable state. `post` stores the answer into
/// the context and signals the next transition.
pub trait Node {
    /// Obtain the next question, or `None` to terminate the loop.
    fn prep(&mut self, ctx: &mut QaContext) -> Option<String>;

    /// Produce an answer for the question given the conversation so far.
    fn exec(
        &self,
        question: &str,
        history: &[Message],
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;

    /// Store the answer into the context and decide the next transition.
    fn post(&self, ctx: &mut QaContext, question: String, answer: String) -> Transition;
}
