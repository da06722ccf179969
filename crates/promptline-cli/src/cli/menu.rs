//! Interactive menu shown when `pline` runs without a subcommand.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use promptline_core::llm::dispatcher::Dispatcher;
use promptline_types::llm::ProviderKind;

use super::{chat, compare, connection};

/// Loop the menu until the user exits. A failed command is reported and the
/// menu comes back.
pub async fn run_menu(
    dispatcher: &Dispatcher,
    provider: Option<ProviderKind>,
) -> anyhow::Result<()> {
    println!();
    println!("  {}", style("Promptline").cyan().bold());
    println!("  Terminal Q&A over hosted LLM providers");

    loop {
        println!();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Choose an option")
            .items(&[
                "Test LLM connection",
                "Q&A chat",
                "Compare providers",
                "Exit",
            ])
            .default(0)
            .interact_opt()?;

        let result = match selection {
            Some(0) => connection::run_test(dispatcher, provider).await,
            Some(1) => chat::run_chat(dispatcher, provider, None).await,
            Some(2) => compare::run_compare(dispatcher).await,
            // Esc or "Exit"
            _ => break,
        };

        if let Err(err) = result {
            eprintln!("  {} {err}", style("✗").red().bold());
        }
    }

    println!("  {} Goodbye!", style("i").blue().bold());
    Ok(())
}
