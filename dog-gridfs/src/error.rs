use thiserror::Error;

/// Result type for storage provider operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage provider operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid connection parameters: {message}")]
    Validation { message: String },

    #[error("Object not found: {container}/{path}")]
    NotFound { container: String, path: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create a backend error carrying only a message
    pub fn backend_message<S: Into<String>>(message: S) -> Self {
        let message: String = message.into();
        Self::Backend {
            source: message.into(),
        }
    }

    /// Create a connection parameter validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<C: Into<String>, P: Into<String>>(container: C, path: P) -> Self {
        Self::NotFound {
            container: container.into(),
            path: path.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

impl From<mongodb::error::Error> for StorageError {
    fn from(error: mongodb::error::Error) -> Self {
        Self::backend(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_keeps_text() {
        let err = StorageError::backend_message("bucket 'photos' does not exist");
        assert!(err.is_backend());
        assert_eq!(
            err.to_string(),
            "Storage backend error: bucket 'photos' does not exist"
        );
    }

    #[test]
    fn not_found_names_container_and_path() {
        let err = StorageError::not_found("photos", "cat.jpg");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Object not found: photos/cat.jpg");
    }
}
