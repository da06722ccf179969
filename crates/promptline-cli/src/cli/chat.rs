//! Interactive Q&A loop.
//!
//! One question per turn: read a line, run it through the Q&A flow, print
//! the answer. History accumulates in the flow context, so follow-up
//! questions see the whole conversation. An error is reported and the loop
//! keeps going.

use std::time::Duration;

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use promptline_core::flow::qa::{QaContext, QaFlow, QaNode, TurnOutcome};
use promptline_core::llm::dispatcher::{CallOptions, Dispatcher};
use promptline_types::llm::ProviderKind;

use super::{print_llm_error, resolve_provider};

/// Run the chat loop until 'quit' or EOF.
pub async fn run_chat(
    dispatcher: &Dispatcher,
    provider: Option<ProviderKind>,
    model: Option<String>,
) -> anyhow::Result<()> {
    let provider = resolve_provider(dispatcher, provider)?;
    let options = CallOptions {
        model,
        ..Default::default()
    };

    println!();
    println!(
        "  {} Chatting with {} (type {} to exit)",
        style("●").cyan(),
        style(provider).cyan().bold(),
        style("quit").yellow()
    );
    println!();

    let mut ctx = QaContext::new();

    loop {
        let line = match read_question() {
            Some(line) => line,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        // A fresh single-question node per turn keeps the spinner scoped to
        // the network call; conversation history lives in the context.
        let node = QaNode::new(dispatcher, vec![line], provider, options.clone());
        let mut flow = QaFlow::new(node);

        let spinner = thinking_spinner();
        let result = flow.next_turn(&mut ctx).await;
        spinner.finish_and_clear();

        match result {
            Ok(TurnOutcome::Answered) => {
                if let Some(answer) = &ctx.answer {
                    println!();
                    println!("  {}", style("Answer:").green().bold());
                    println!("  {answer}");
                    println!();
                }
            }
            Ok(TurnOutcome::Terminated) => break,
            Err(err) => {
                print_llm_error(&err);
                println!();
            }
        }
    }

    println!("  {} Goodbye!", style("i").blue().bold());
    Ok(())
}

/// Read one question from the terminal. `None` on EOF or interrupt.
fn read_question() -> Option<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Your question")
        .allow_empty(true)
        .interact_text()
        .ok()
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
