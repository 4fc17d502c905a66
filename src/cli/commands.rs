//! CLI command definitions using clap.
//!
//! - run: discover and boost resumes until interrupted (default)
//! - check: validate the configuration and print the resolved schedule

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Boostr - periodically boosts HeadHunter resumes
#[derive(Parser, Debug)]
#[command(name = "boostr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// HeadHunter login (overrides the config file)
    #[arg(short, long, global = true, env = "BOOSTR_LOGIN")]
    pub login: Option<String>,

    /// HeadHunter password (overrides the config file)
    #[arg(short, long, global = true, env = "BOOSTR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Subcommand to run, `run` when none was given
    pub fn selected(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Discover and boost resumes until interrupted
    Run,

    /// Validate the configuration and print the resolved schedule
    Check,
}
