//! Error types for port operations.

/// Classified outcome of a failed generation attempt.
///
/// The display string is the bare message so it can be surfaced to the user
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Transient - the model is busy, a later attempt may succeed.
    #[error("{0}")]
    Overloaded(String),
    /// Terminal - retrying will not help.
    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    pub fn overloaded(message: impl ToString) -> Self {
        Self::Overloaded(message.to_string())
    }

    pub fn other(message: impl ToString) -> Self {
        Self::Other(message.to_string())
    }

    /// Only overload failures are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Overloaded(_))
    }
}

/// Key-value storage errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem operation failed - includes operation name for tracing.
    #[error("Storage I/O error in {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },

    /// Stored payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Create an Io error with operation context.
    pub fn io(operation: &'static str, message: impl ToString) -> Self {
        Self::Io {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageEncodeError {
    #[error("Image is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Failed to read image: {0}")]
    Io(String),
}
