// src/cli/mod.rs
use clap::Parser;

pub mod commands;
pub mod handlers;
pub mod menu;

pub use commands::CliCommand;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database URL (falls back to DATABASE_URL, then sqlite:./data/passguard.db)
    #[arg(long, short, env = "DATABASE_URL")]
    pub db: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<String>,

    /// Command to execute; leave empty for the interactive menu
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}
