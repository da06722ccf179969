//! Provider connection test.
//!
//! Sends a tiny canary prompt and reports whether the provider answered.
//! With `--provider` only that provider is tested, otherwise every
//! configured one.

use console::style;

use promptline_core::llm::dispatcher::{CallOptions, Dispatcher};
use promptline_types::llm::ProviderKind;

use super::print_llm_error;

const CANARY_PROMPT: &str = "Say 'Hello! LLM is working!' if you can read this.";

/// Run the connection test. Fails (exit code 1) when any tested provider
/// does not answer.
pub async fn run_test(
    dispatcher: &Dispatcher,
    provider: Option<ProviderKind>,
) -> anyhow::Result<()> {
    let kinds = match provider {
        Some(kind) => vec![kind],
        None => dispatcher.registry().kinds(),
    };
    if kinds.is_empty() {
        anyhow::bail!(
            "no provider configured. Set OPENAI_API_KEY or ANTHROPIC_API_KEY \
             and try again."
        );
    }

    println!();
    println!("  {}", style("Connection Test").bold());
    println!();

    let mut failures = 0usize;
    for kind in &kinds {
        println!("  {} Testing {}...", style("●").blue(), style(kind).cyan());
        match dispatcher
            .call(CANARY_PROMPT, *kind, CallOptions::default())
            .await
        {
            Ok(response) => {
                println!("  {} {kind}: {response}", style("✓").green().bold());
            }
            Err(err) => {
                failures += 1;
                print_llm_error(&err);
            }
        }
        println!();
    }

    if failures > 0 {
        anyhow::bail!(
            "{failures} of {} provider(s) failed the connection test",
            kinds.len()
        );
    }
    println!("  {} All providers answered.", style("✓").green().bold());
    Ok(())
}
