//! CLI entry point for the assistant bridge.

pub mod ask;

use clap::{Parser, Subcommand};

/// Assistant bridge CLI
#[derive(Parser, Debug)]
#[command(
    name = "assistant-bridge",
    version,
    about = "Send messages to an assistant thread and print the reply"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message and wait for the assistant's reply
    Ask(AskArgs),
    /// Create an empty thread and print its id
    NewThread,
}

/// Arguments for the `ask` subcommand.
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Message text
    pub prompt: String,

    /// Continue an existing thread instead of creating one
    #[arg(short, long)]
    pub thread: Option<String>,

    /// Skip resolving image download URLs
    #[arg(long)]
    pub no_image_urls: bool,
}
