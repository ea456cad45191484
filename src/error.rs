use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("document sink unavailable: {0}")]
    SinkUnavailable(String),
    #[error("document write failed: {0}")]
    SinkWriteFailed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
