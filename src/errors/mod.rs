// Application error type and result alias, built on thiserror.
use thiserror::Error;

pub mod response;
pub mod pipeline;

pub use pipeline::{ExportError, ImportError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Export not ready: {0}")]
    NotReady(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("Serialization failed: {}", err))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Storage(format!("Password hashing failed: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
