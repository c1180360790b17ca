//! Error types for the match session controller

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Unable to load match: {0}")]
    Fetch(String),

    #[error("Match stream failed: {0}")]
    Stream(String),

    #[error("Command rejected: {0}")]
    Command(String),

    #[error("Match state not loaded yet")]
    NotLoaded,

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Player not in match: {0}")]
    PlayerNotFound(String),

    #[error("Invalid session script: {0}")]
    InvalidScript(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SessionError {
    /// Human-readable message without the variant prefix, suitable for UI feedback
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Fetch(msg)
            | SessionError::Stream(msg)
            | SessionError::Command(msg)
            | SessionError::InvalidScript(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
