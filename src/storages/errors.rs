//! # Storage Errors

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage errors.
///
/// `NotFound`, `TypeMismatch` and `NotAllowed` are the domain vocabulary every
/// provider translates its backend failures into. The remaining variants carry
/// failures that have no domain meaning and are surfaced opaquely.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    // Domain errors
    #[error("Not found {0}")]
    NotFound(String),

    #[error("Type mismatch {0}")]
    TypeMismatch(String),

    /// Reserved for permission checks; no provider raises it yet.
    #[error("Not allowed to access {0}")]
    NotAllowed(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid entry name: {0:?}")]
    InvalidName(String),

    // Backend errors
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("HTTP error on {key}: {message}")]
    Http {
        key: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Translate an OS error for `path` into the domain vocabulary
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path),
            std::io::ErrorKind::NotADirectory | std::io::ErrorKind::IsADirectory => {
                StorageError::TypeMismatch(path)
            }
            _ => StorageError::Io {
                path,
                message: err.to_string(),
            },
        }
    }

    /// Translate a non-success HTTP status for `key`
    pub fn from_status(key: impl Into<String>, status: u16, reason: &str) -> Self {
        let key = key.into();
        match status {
            404 => StorageError::NotFound(key),
            _ => StorageError::Http {
                key,
                status: Some(status),
                message: reason.to_string(),
            },
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::NotFound(_) => 404,
            StorageError::TypeMismatch(_) => 409,
            StorageError::NotAllowed(_) => 403,
            StorageError::NotImplemented(_) => 501,
            StorageError::InvalidName(_) => 400,
            StorageError::Io { .. } => 500,
            StorageError::Http { .. } => 502,
            StorageError::InvalidData(_) => 422,
            StorageError::InvalidConfig(_) => 500,
            StorageError::Internal(_) => 500,
        }
    }
}
