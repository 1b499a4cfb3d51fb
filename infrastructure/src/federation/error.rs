//! Error types for the federation layer

use thiserror::Error;
use toolbridge_application::CatalogError;

/// Result type alias for federation operations
pub type Result<T> = std::result::Result<T, FederationError>;

/// Errors that can occur while wiring or using provider channels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FederationError {
    #[error("Transport closed")]
    TransportClosed,

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Client is already connected")]
    AlreadyConnected,

    #[error("Client is not connected")]
    NotConnected,

    #[error("Tool '{tool}' is already registered on server '{server}'")]
    DuplicateTool { server: String, tool: String },

    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Task shutdown failed: {0}")]
    Shutdown(String),
}

impl From<FederationError> for CatalogError {
    fn from(err: FederationError) -> Self {
        match err {
            FederationError::TransportClosed => CatalogError::TransportClosed,
            FederationError::ToolNotFound(name) => CatalogError::ToolNotFound(name),
            FederationError::AlreadyConnected => CatalogError::AlreadyConnected,
            FederationError::NotConnected => CatalogError::NotConnected,
            FederationError::Rpc { code, message } => CatalogError::Rpc { code, message },
            other => CatalogError::Rpc {
                code: super::protocol::error_codes::INTERNAL_ERROR,
                message: other.to_string(),
            },
        }
    }
}
