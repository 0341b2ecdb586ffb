//! # Nimbus CLI Library
//!
//! Core library for the `nimbus` command-line client: operation catalog,
//! request signing, API client, config store and the interactive shell.

use clap::Parser;

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod shell;
pub mod signer;

/// Command-line surface: no arguments enters the interactive shell, any
/// trailing arguments are joined and executed as exactly one command.
#[derive(Parser)]
#[command(
    name = "nimbus",
    version,
    about = "Interactive command-line client for the Nimbus cloud API",
    override_usage = "nimbus\n       nimbus <command> [key=value ...]"
)]
pub struct Cli {
    /// Command line to run non-interactively (e.g. `DescribeFoo Id=42`)
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub line: Vec<String>,
}
