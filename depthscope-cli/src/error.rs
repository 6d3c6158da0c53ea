//! CLI error types.

use thiserror::Error;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The recorded stream could not be opened.
    #[error("failed to open recorded stream: {0}")]
    Open(#[from] depthscope::SourceError),

    /// The viewer session failed.
    #[error(transparent)]
    Session(#[from] depthscope::SessionError),

    /// Invalid command-line configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Terminal setup or drawing failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Writing a snapshot failed.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
