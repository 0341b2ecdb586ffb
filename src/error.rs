//! Error types for the Nimbus CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or executing a shell command.
///
/// Everything except `ConfigMissing` is recoverable: the shell prints the
/// display line and returns to the prompt. `ConfigMissing` is handled in
/// `main` before any command runs (template printed, exit code 2).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    #[error("config file not found at {}", .path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid JSON in response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
