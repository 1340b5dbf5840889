use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotchError {
    #[error("{0}")]
    Validation(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("could not read order file {}: {reason}", path.display())]
    Storage { path: PathBuf, reason: String },

    #[error("session store error: {0}")]
    SessionDb(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotchError>;
