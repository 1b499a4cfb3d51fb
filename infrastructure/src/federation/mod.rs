//! Tool federation over in-process channels.
//!
//! ```text
//! ToolRegistry ──▶ ToolClient ══ DuplexChannel ══▶ ToolServer ──▶ ToolHandler
//!      │               ▲                                │
//!      │               └──── JsonRpcResponse (by id) ◀──┘
//!      └──▶ (one client + channel per provider)
//! ```
//!
//! - [`channel`]: paired in-memory pipes with a shared close state
//! - [`protocol`]: JSON-RPC 2.0 shaped messages (`initialize`,
//!   `tools/list`, `tools/call`)
//! - [`server`]: [`ToolServer`](server::ToolServer), the provider side
//! - [`client`]: [`ToolClient`](client::ToolClient), the consumer side
//! - [`registry`]: [`ToolRegistry`](registry::ToolRegistry), merging
//!   several providers into one catalog

pub mod channel;
pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;

pub use channel::{ChannelEnd, ChannelReceiver, ChannelSender, DuplexChannel};
pub use client::ToolClient;
pub use error::FederationError;
pub use protocol::ImplementationInfo;
pub use registry::{FederationFailure, RegistryCloseError, RegistryStats, ToolRegistry};
pub use server::{ServerConnection, ToolProvider, ToolServer};

use std::sync::Arc;

/// Connect a fresh [`ToolClient`] to a provider over its own channel.
///
/// Used when one component needs a private consumer of another provider,
/// outside the registry.
pub async fn connect_client(
    provider: Arc<dyn ToolProvider>,
    client_name: &str,
) -> error::Result<(ToolClient, ServerConnection)> {
    let (provider_end, consumer_end) = DuplexChannel::pair();
    let connection = provider.connect(provider_end);
    let client = ToolClient::new(client_name, env!("CARGO_PKG_VERSION"));
    client.connect(consumer_end).await?;
    Ok((client, connection))
}
