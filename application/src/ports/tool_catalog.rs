//! Tool Catalog port
//!
//! Defines the interface for discovering and calling tools, whether they are
//! served by one provider over a channel or merged from several.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use toolbridge_domain::tool::{
    entities::{ToolArguments, ToolDescriptor},
    value_objects::CallToolResult,
};

/// Errors surfaced by a tool catalog.
///
/// These are wiring errors and propagate to the caller unchanged; tool-level
/// failures arrive as a [`CallToolResult`] with `is_error` set instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Transport closed")]
    TransportClosed,

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Client is already connected")]
    AlreadyConnected,

    #[error("Client is not connected")]
    NotConnected,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// Port for tool discovery and invocation
#[async_trait]
pub trait ToolCatalogPort: Send + Sync {
    /// Descriptors of every callable tool
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, CatalogError>;

    /// Call a tool by name
    async fn call_tool(
        &self,
        name: &str,
        arguments: ToolArguments,
    ) -> Result<CallToolResult, CatalogError>;

    /// Check if a tool is available
    async fn has_tool(&self, name: &str) -> Result<bool, CatalogError> {
        Ok(self.list_tools().await?.iter().any(|t| t.name == name))
    }
}

#[async_trait]
impl<T: ToolCatalogPort + ?Sized> ToolCatalogPort for Arc<T> {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, CatalogError> {
        (**self).list_tools().await
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: ToolArguments,
    ) -> Result<CallToolResult, CatalogError> {
        (**self).call_tool(name, arguments).await
    }
}
