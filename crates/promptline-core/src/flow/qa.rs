//! Q&A node and loop.
//!
//! `QaNode` wires a question source and the dispatcher into the three-step
//! node contract; `QaFlow` drives the Awaiting-Question -> Processing loop
//! one turn at a time so the caller decides how to display answers and
//! errors.

use promptline_types::error::LlmError;
use promptline_types::llm::{Message, ProviderKind};

use crate::llm::dispatcher::{CallOptions, Dispatcher};

use super::node::{Node, Transition};

/// Literal quit keyword terminating the Q&A loop (case-insensitive).
pub const QUIT_SENTINEL: &str = "quit";

/// Shared context passed explicitly between pipeline stages.
#[derive(Debug, Default, Clone)]
pub struct QaContext {
    /// Question of the current turn.
    pub question: Option<String>,
    /// Answer of the current turn.
    pub answer: Option<String>,
    /// Conversation so far, oldest first.
    pub history: Vec<Message>,
}

impl QaContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Supplies questions to the flow.
///
/// The CLI reads stdin; tests supply a script. `None` means the source is
/// exhausted, which terminates the loop like the quit sentinel does.
pub trait QuestionSource {
    fn next_question(&mut self) -> Option<String>;
}

impl QuestionSource for Vec<String> {
    fn next_question(&mut self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove(0))
        }
    }
}

/// Q&A node: reads a question, asks the dispatcher, stores the answer.
pub struct QaNode<'a, S: QuestionSource> {
    dispatcher: &'a Dispatcher,
    source: S,
    provider: ProviderKind,
    options: CallOptions,
}

impl<'a, S: QuestionSource> QaNode<'a, S> {
    pub fn new(
        dispatcher: &'a Dispatcher,
        source: S,
        provider: ProviderKind,
        options: CallOptions,
    ) -> Self {
        Self {
            dispatcher,
            source,
            provider,
            options,
        }
    }
}

// `exec` borrows `&self` across an await, so its `Send` future needs
// `QaNode: Sync`, which hinges on the source.
impl<S: QuestionSource + Sync> Node for QaNode<'_, S> {
    fn prep(&mut self, _ctx: &mut QaContext) -> Option<String> {
        let question = self.source.next_question()?;
        let trimmed = question.trim();
        if trimmed.eq_ignore_ascii_case(QUIT_SENTINEL) {
            return None;
        }
        Some(trimmed.to_string())
    }

    async fn exec(&self, question: &str, history: &[Message]) -> Result<String, LlmError> {
        let mut messages = history.to_vec();
        messages.push(Message::user(question));
        self.dispatcher
            .call_with_history(messages, self.provider, self.options.clone())
            .await
    }

    fn post(&self, ctx: &mut QaContext, question: String, answer: String) -> Transition {
        ctx.history.push(Message::user(question.clone()));
        ctx.history.push(Message::assistant(answer.clone()));
        ctx.question = Some(question);
        ctx.answer = Some(answer);
        Transition::Continue
    }
}

/// Outcome of a single flow turn.
#[derive(Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A question was answered and stored into the context.
    Answered,
    /// The quit sentinel was seen or the source is exhausted.
    Terminated,
}

/// Drives a [`Node`] through the two-state loop, one turn at a time.
pub struct QaFlow<N: Node> {
    node: N,
}

impl<N: Node> QaFlow<N> {
    pub fn new(node: N) -> Self {
        Self { node }
    }

    /// Run one prep/exec/post cycle.
    ///
    /// A classified error from `exec` propagates with the context untouched,
    /// so the caller can report it and keep looping.
    pub async fn next_turn(&mut self, ctx: &mut QaContext) -> Result<TurnOutcome, LlmError> {
        let Some(question) = self.node.prep(ctx) else {
            return Ok(TurnOutcome::Terminated);
        };

        let answer = self.node.exec(&question, &ctx.history).await?;

        match self.node.post(ctx, question, answer) {
            Transition::Continue => Ok(TurnOutcome::Answered),
            Transition::Terminate => Ok(TurnOutcome::Terminated),
        }
    }
}
