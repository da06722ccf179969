//! Promptline CLI entry point.
//!
//! Binary name: `pline`
//!
//! Parses CLI arguments, builds the provider registry from the environment,
//! then dispatches to a command handler or the interactive menu.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use promptline_core::llm::dispatcher::Dispatcher;
use promptline_infra::config::build_registry;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,promptline=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let registry = build_registry();
    tracing::debug!(providers = ?registry.kinds(), "registry built");

    let mut dispatcher = Dispatcher::new(registry);
    if let Some(fallback) = cli.fallback {
        dispatcher = dispatcher.with_fallback(fallback);
    }

    match cli.command {
        Some(Commands::Chat { model }) => {
            cli::chat::run_chat(&dispatcher, cli.provider, model).await?;
        }
        Some(Commands::Test) => {
            cli::connection::run_test(&dispatcher, cli.provider).await?;
        }
        Some(Commands::Compare) => {
            cli::compare::run_compare(&dispatcher).await?;
        }
        None => {
            cli::menu::run_menu(&dispatcher, cli.provider).await?;
        }
    }

    Ok(())
}
