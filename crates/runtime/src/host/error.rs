//! Errors raised by host port implementations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("{0} lock was poisoned")]
    LockPoisoned(&'static str),

    #[error("unknown actor `{0}`")]
    UnknownActor(String),

    #[error("unknown document `{0}`")]
    UnknownDocument(String),

    #[error("host rejected the request: {0}")]
    Rejected(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type HostResult<T> = std::result::Result<T, HostError>;
