//! Provider comparison view.
//!
//! Sends the same prompt to every configured provider and renders the
//! answers side by side with model, latency, and token usage.

use std::time::Instant;

use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use promptline_core::llm::dispatcher::Dispatcher;
use promptline_types::llm::CompletionRequest;

const COMPARE_PROMPT: &str = "What is 2+2? Answer with just the number.";

/// Run the comparison and print the result table.
pub async fn run_compare(dispatcher: &Dispatcher) -> anyhow::Result<()> {
    let kinds = dispatcher.registry().kinds();
    if kinds.is_empty() {
        anyhow::bail!(
            "no provider configured. Set OPENAI_API_KEY or ANTHROPIC_API_KEY \
             and try again."
        );
    }

    println!();
    println!("  {}", style("Provider Comparison").bold());
    println!("  Prompt: {}", style(COMPARE_PROMPT).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Provider").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Latency").fg(Color::White),
        Cell::new("Tokens").fg(Color::White),
        Cell::new("Answer").fg(Color::White),
    ]);

    for kind in kinds {
        let request = CompletionRequest::from_prompt(kind, COMPARE_PROMPT).max_tokens(100);
        let started = Instant::now();
        let result = dispatcher.dispatch(&request).await;
        let elapsed = started.elapsed();
        let latency = format!("{}ms", elapsed.as_millis());

        match result {
            Ok(response) => {
                let tokens = response
                    .usage
                    .map(|u| format!("{}+{}", u.input_tokens, u.output_tokens))
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![
                    Cell::new(kind).fg(Color::Cyan),
                    Cell::new(&response.model).fg(Color::DarkGrey),
                    Cell::new(latency).fg(Color::White),
                    Cell::new(tokens).fg(Color::DarkGrey),
                    Cell::new(truncate(response.text.trim(), 60)).fg(Color::Green),
                ]);
            }
            Err(err) => {
                table.add_row(vec![
                    Cell::new(kind).fg(Color::Cyan),
                    Cell::new("-").fg(Color::DarkGrey),
                    Cell::new(latency).fg(Color::White),
                    Cell::new("-").fg(Color::DarkGrey),
                    Cell::new(truncate(
                        &format!("{err} [{}]", err.classification()),
                        60,
                    ))
                    .fg(Color::Red),
                ]);
            }
        }
    }

    println!("{table}");
    println!();
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
