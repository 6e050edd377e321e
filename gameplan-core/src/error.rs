//! Error types for gameplan.

use thiserror::Error;

/// Errors that can occur during a gameplan run.
#[derive(Error, Debug)]
pub enum GameplanError {
    /// Network or provider unavailable. Retryable on the next run.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered but rejected the request.
    #[error("Provider error: {0}")]
    Provider(String),

    /// An expected registry or game row is missing.
    #[error("Not found: {0}")]
    NotFoundLocal(String),

    /// A local store read or write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The schedule source could not be fetched or parsed.
    #[error("Source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for GameplanError {
    fn from(e: rusqlite::Error) -> Self {
        GameplanError::Persistence(e.to_string())
    }
}

impl From<reqwest::Error> for GameplanError {
    fn from(e: reqwest::Error) -> Self {
        GameplanError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for GameplanError {
    fn from(e: serde_json::Error) -> Self {
        GameplanError::Serialization(e.to_string())
    }
}

/// Result type alias for gameplan operations.
pub type GameplanResult<T> = Result<T, GameplanError>;
