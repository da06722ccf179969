//! CLI command definitions and shared helpers for the `pline` binary.
//!
//! Uses clap derive macros for argument parsing. Running without a
//! subcommand opens the interactive menu.

pub mod chat;
pub mod compare;
pub mod connection;
pub mod menu;

use anyhow::bail;
use clap::{Parser, Subcommand};
use console::style;

use promptline_core::llm::dispatcher::Dispatcher;
use promptline_types::error::LlmError;
use promptline_types::llm::ProviderKind;

/// Ask hosted LLMs questions from your terminal.
#[derive(Parser)]
#[command(name = "pline", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Provider to use: "openai" or "anthropic". Defaults to the first
    /// configured one.
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    /// Provider to fall back to when the primary keeps failing.
    #[arg(long, global = true)]
    pub fallback: Option<ProviderKind>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive Q&A loop (type 'quit' to exit).
    Chat {
        /// Model override (e.g. gpt-4o-mini).
        #[arg(long)]
        model: Option<String>,
    },

    /// Verify provider connectivity with a canary prompt.
    Test,

    /// Send the same prompt to every configured provider and compare.
    Compare,
}

/// Pick the provider for a command: explicit flag first, then the first
/// configured one.
pub fn resolve_provider(
    dispatcher: &Dispatcher,
    flag: Option<ProviderKind>,
) -> anyhow::Result<ProviderKind> {
    if let Some(kind) = flag {
        return Ok(kind);
    }
    match dispatcher.registry().kinds().first() {
        Some(kind) => Ok(*kind),
        None => bail!(
            "no provider configured. Set OPENAI_API_KEY or ANTHROPIC_API_KEY \
             and try again."
        ),
    }
}

/// Print a classified LLM error in a single styled line.
pub fn print_llm_error(err: &LlmError) {
    eprintln!(
        "  {} {} {}",
        style("✗").red().bold(),
        err,
        style(format!("[{}]", err.classification())).dim()
    );
}
