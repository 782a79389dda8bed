//! Error types for the medrag server.

use medrag_retrieval::RetrievalError;
use thiserror::Error;

use crate::rpc::JsonRpcError;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Embedder not available: {0}")]
    EmbedderUnavailable(String),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Whether the client sent something invalid, as opposed to a backend failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServerError::InvalidParams(_) => true,
            ServerError::Retrieval(e) => e.is_client_error(),
            _ => false,
        }
    }
}

impl From<ServerError> for JsonRpcError {
    fn from(err: ServerError) -> Self {
        if err.is_client_error() {
            JsonRpcError::invalid_params(err.to_string())
        } else {
            JsonRpcError::internal_error(err.to_string())
        }
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
