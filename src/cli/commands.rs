// src/cli/commands.rs
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Analyze a password's strength (prompted, nothing stored)
    Analyze,

    /// Generate passwords and print them with their scores (nothing stored)
    Generate {
        /// Password length
        #[arg(long, short, default_value_t = 16)]
        length: usize,

        /// How many passwords to generate
        #[arg(long, short, default_value_t = 1)]
        count: usize,

        /// Leave uppercase letters out of the character pool
        #[arg(long)]
        no_uppercase: bool,

        /// Leave digits out of the character pool
        #[arg(long)]
        no_digits: bool,

        /// Leave symbols out of the character pool
        #[arg(long)]
        no_symbols: bool,
    },

    /// Show one user's testing and breach statistics
    Stats {
        /// Username to report on
        #[arg(required = true)]
        username: String,

        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show system-wide aggregates across all users
    Overview {
        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}
