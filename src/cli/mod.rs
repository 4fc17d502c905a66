//! CLI module for boostr - command-line flags and subcommands.

pub mod commands;

pub use commands::Cli;
