//! Error types for the debate session client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("Case initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Realtime channel error: {0}")]
    ChannelError(String),

    #[error("Realtime channel is closed")]
    ChannelClosed,

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("No concluded debate available to save")]
    NoSaveCandidate,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
