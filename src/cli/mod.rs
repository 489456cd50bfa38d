//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "condense",
    version,
    about = "Compact verbose coding-session output while keeping what matters",
    long_about = "Condense classifies verbose output from coding sessions (build logs, test runs, \
                  HTTP logs, stack traces, prose, source snippets), picks a reduction strategy, and \
                  prints a compacted representation with before/after token statistics."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/condense/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Optimize captured output (detects content type automatically)
    Optimize {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Routing hint: auto, build, logs, errors, or code
        #[arg(long, default_value = "auto")]
        hint: String,

        /// Detail level: minimal, normal, or detailed
        #[arg(short, long, default_value = "normal")]
        detail: String,

        /// Emit the full result as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Group error lines by normalized signature
    Group {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Emit groups and statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize log output with the best-matching summarizer
    Summarize {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Detail level: minimal, normal, or detailed
        #[arg(short, long, default_value = "normal")]
        detail: String,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the active config path)
        file: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
