//! Error types for Komando.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KomandoError {
    /// Network, auth, quota or malformed-response failure at the classifier boundary.
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Reserved: the default executor resolves every category normally.
    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("A request is already being processed")]
    Busy,

    #[error("Utterance is empty")]
    EmptyUtterance,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KomandoError>;
