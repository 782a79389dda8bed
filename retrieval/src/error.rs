//! Error types for medrag-retrieval

use thiserror::Error;

/// Errors that can occur in the retrieval engine
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Invalid engine or index configuration (e.g. zero dimension)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A vector's length disagrees with the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Search issued against an index holding no vectors
    #[error("Index is empty; load a corpus before querying")]
    EmptyIndex,

    /// Caller passed an invalid argument (e.g. k = 0)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Corpus load with zero documents
    #[error("Corpus is empty; at least one document is required")]
    CorpusEmpty,

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Model loading error
    #[error("Model error: {0}")]
    Model(String),

    /// Snapshot is unreadable or inconsistent
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Index and document store disagree; indicates a bug, never caller input
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error (bincode)
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RetrievalError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was caused by the caller's input rather than the backend.
    ///
    /// Front ends use this to keep "your input was invalid" apart from
    /// "the retrieval backend failed".
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Result type for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = RetrievalError::dimension_mismatch(384, 3);
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 3");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RetrievalError::invalid_argument("k must be positive").is_client_error());
        assert!(!RetrievalError::EmptyIndex.is_client_error());
        assert!(!RetrievalError::embedding("backend down").is_client_error());
        assert!(!RetrievalError::CorpusEmpty.is_client_error());
    }
}
