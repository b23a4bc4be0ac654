//! Storage error types.

use aegis_auth::AuthError;
use aegis_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The host blocks persistent storage.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// I/O error in a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key the backend cannot store (empty).
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Storage directory creation failed.
    #[error("failed to create storage directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Creates an Unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Creates an InvalidKey error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }

    /// Creates a DirectoryCreation error.
    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for StorageError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "STORAGE_UNAVAILABLE",
            Self::Io(_) => "STORAGE_IO",
            Self::Serialization(_) => "STORAGE_SERIALIZATION",
            Self::InvalidKey(_) => "STORAGE_INVALID_KEY",
            Self::DirectoryCreation { .. } => "STORAGE_DIRECTORY_CREATION",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::storage_unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_types::assert_error_codes;

    #[test]
    fn error_codes_follow_convention() {
        assert_error_codes(
            &[
                StorageError::unavailable("blocked"),
                StorageError::invalid_key(""),
                StorageError::directory_creation(
                    "/x",
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                ),
            ],
            "STORAGE_",
        );
    }

    #[test]
    fn converts_to_storage_unavailable_auth_error() {
        let err = AuthError::from(StorageError::unavailable("quota"));
        assert_eq!(err.code(), "AUTH_STORAGE_UNAVAILABLE");
        assert!(err.to_string().contains("quota"), "got: {err}");
    }
}
