use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Invalid pattern for phrase '{phrase}': {source}")]
    Pattern {
        phrase: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No text in message")]
    NoText,

    #[error("State error: {0}")]
    State(String),
}

impl CombotError {
    /// Shorthand for a load failure on `path`.
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CombotError::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CombotError>;
