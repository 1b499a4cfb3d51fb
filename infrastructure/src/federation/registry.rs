//! Tool Registry (federation of several providers)
//!
//! [`ToolRegistry::federate`] connects every provider over its own
//! [`DuplexChannel`], lists its tools and merges them into one namespace.
//!
//! # Collision policy
//!
//! Providers are federated strictly in the given order. When two providers
//! expose the same tool name the **later provider wins**: calls route to it
//! and its descriptor replaces the earlier one. The entry keeps the list
//! position of the first registration, so `list_tools` order is the order
//! in which names were first seen. Every shadowing is logged at `warn`.
//!
//! The merged table is built once and never refreshed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tokio::sync::OnceCell;
use toolbridge_application::{CatalogError, ToolCatalogPort};
use toolbridge_domain::tool::{CallToolResult, ToolArguments, ToolDescriptor};
use tracing::{debug, info, warn};

use super::channel::DuplexChannel;
use super::client::ToolClient;
use super::error::{FederationError, Result};
use super::server::{ServerConnection, ToolProvider};

const CLIENT_NAME: &str = "toolbridge-registry";

/// Every failure observed while closing the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to close {} provider(s): {}", .failures.len(), describe(.failures))]
pub struct RegistryCloseError {
    pub failures: Vec<(String, FederationError)>,
}

fn describe(failures: &[(String, FederationError)]) -> String {
    failures
        .iter()
        .map(|(provider, e)| format!("{}: {}", provider, e))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A provider that could not be federated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederationFailure {
    pub provider: String,
    pub error: FederationError,
}

/// Statistics about the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_providers: usize,
    pub total_tools: usize,
    pub tools_per_provider: HashMap<String, usize>,
    pub shadowed_tools: usize,
    pub failed_providers: usize,
}

struct ProviderHandle {
    name: String,
    client: ToolClient,
}

struct RegistryEntry {
    descriptor: ToolDescriptor,
    provider: usize,
}

/// Merged catalog over several tool providers
pub struct ToolRegistry {
    providers: Vec<ProviderHandle>,
    entries: Vec<RegistryEntry>,
    by_name: HashMap<String, usize>,
    connections: Mutex<Vec<ServerConnection>>,
    failures: Vec<FederationFailure>,
    shadowed: usize,
    closed: OnceCell<std::result::Result<usize, RegistryCloseError>>,
}

impl ToolRegistry {
    /// Connect to every provider in order and merge their catalogs.
    ///
    /// A provider whose handshake or listing fails is logged, closed and
    /// skipped; see [`failures`](Self::failures).
    pub async fn federate(providers: Vec<Arc<dyn ToolProvider>>) -> Self {
        let mut registry = Self {
            providers: Vec::new(),
            entries: Vec::new(),
            by_name: HashMap::new(),
            connections: Mutex::new(Vec::new()),
            failures: Vec::new(),
            shadowed: 0,
            closed: OnceCell::new(),
        };

        for provider in providers {
            let name = provider.name().to_string();
            let (provider_end, consumer_end) = DuplexChannel::pair();
            let connection = provider.connect(provider_end);
            let client = ToolClient::new(CLIENT_NAME, env!("CARGO_PKG_VERSION"));

            let listed = match client.connect(consumer_end).await {
                Ok(_) => client.list_tools().await,
                Err(e) => Err(e),
            };

            match listed {
                Ok(tools) => {
                    info!(provider = %name, tools = tools.len(), "Federated provider");
                    registry.add_provider(name, client, tools);
                    registry.lock_connections().push(connection);
                }
                Err(error) => {
                    warn!(provider = %name, %error, "Skipping provider that failed to federate");
                    let _ = client.close().await;
                    if let Err(e) = connection.join().await {
                        debug!(provider = %name, error = %e, "Provider task ended abnormally");
                    }
                    registry.failures.push(FederationFailure {
                        provider: name,
                        error,
                    });
                }
            }
        }

        registry
    }

    fn add_provider(&mut self, name: String, client: ToolClient, tools: Vec<ToolDescriptor>) {
        let provider = self.providers.len();

        for descriptor in tools {
            match self.by_name.get(&descriptor.name) {
                Some(&index) => {
                    let previous = &self.providers[self.entries[index].provider].name;
                    warn!(
                        tool = %descriptor.name,
                        previous = %previous,
                        provider = %name,
                        "Tool name collision; later provider wins"
                    );
                    self.shadowed += 1;
                    self.entries[index] = RegistryEntry {
                        descriptor,
                        provider,
                    };
                }
                None => {
                    debug!(tool = %descriptor.name, provider = %name, "Registered tool");
                    self.by_name
                        .insert(descriptor.name.clone(), self.entries.len());
                    self.entries.push(RegistryEntry {
                        descriptor,
                        provider,
                    });
                }
            }
        }

        self.providers.push(ProviderHandle { name, client });
    }

    fn lock_connections(&self) -> std::sync::MutexGuard<'_, Vec<ServerConnection>> {
        self.connections.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Merged descriptors in first-seen order
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Name of the provider a tool routes to
    pub fn provider_for(&self, name: &str) -> Option<&str> {
        let index = *self.by_name.get(name)?;
        Some(self.providers[self.entries[index].provider].name.as_str())
    }

    /// Providers that could not be federated
    pub fn failures(&self) -> &[FederationFailure] {
        &self.failures
    }

    /// Route a call to the owning provider
    pub async fn call(&self, name: &str, arguments: ToolArguments) -> Result<CallToolResult> {
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| FederationError::ToolNotFound(name.to_string()))?;
        let provider = &self.providers[self.entries[index].provider];
        debug!(tool = %name, provider = %provider.name, "Routing tool call");
        provider.client.call_tool(name, arguments).await
    }

    /// Close every provider client exactly once, concurrently.
    ///
    /// Concurrent and repeated calls share one closing pass and observe the
    /// same outcome: the number of clients closed, or every failure.
    pub async fn close(&self) -> std::result::Result<usize, RegistryCloseError> {
        self.closed
            .get_or_init(|| self.close_all())
            .await
            .clone()
    }

    async fn close_all(&self) -> std::result::Result<usize, RegistryCloseError> {
        let outcomes = join_all(self.providers.iter().map(|p| async move {
            (p.name.clone(), p.client.close().await)
        }))
        .await;

        let mut closed = 0;
        let mut failures = Vec::new();
        for (provider, outcome) in outcomes {
            match outcome {
                Ok(true) => closed += 1,
                Ok(false) => debug!(provider = %provider, "Client was already closed"),
                Err(e) => failures.push((provider, e)),
            }
        }

        let connections: Vec<ServerConnection> = self.lock_connections().drain(..).collect();
        let joined = join_all(connections.into_iter().map(|c| async move {
            let server = c.server().to_string();
            (server, c.join().await)
        }))
        .await;
        for (server, outcome) in joined {
            if let Err(e) = outcome {
                failures.push((server, e));
            }
        }

        if failures.is_empty() {
            info!(closed, "Closed tool registry");
            Ok(closed)
        } else {
            warn!(failures = failures.len(), "Tool registry closed with failures");
            Err(RegistryCloseError { failures })
        }
    }

    pub fn stats(&self) -> RegistryStats {
        let mut tools_per_provider = HashMap::new();
        for entry in &self.entries {
            *tools_per_provider
                .entry(self.providers[entry.provider].name.clone())
                .or_insert(0) += 1;
        }

        RegistryStats {
            total_providers: self.providers.len(),
            total_tools: self.entries.len(),
            tools_per_provider,
            shadowed_tools: self.shadowed,
            failed_providers: self.failures.len(),
        }
    }
}

#[async_trait]
impl ToolCatalogPort for ToolRegistry {
    async fn list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, CatalogError> {
        Ok(self.tools())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: ToolArguments,
    ) -> std::result::Result<CallToolResult, CatalogError> {
        Ok(self.call(name, arguments).await?)
    }

    async fn has_tool(&self, name: &str) -> std::result::Result<bool, CatalogError> {
        Ok(ToolRegistry::has_tool(self, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federation::channel::ChannelEnd;
    use crate::federation::server::ToolServer;
    use toolbridge_domain::tool::handler_fn;

    fn provider(name: &str, tools: &[&str]) -> Arc<dyn ToolProvider> {
        let mut server = ToolServer::new(name, "1.0.0");
        for tool in tools {
            let text = format!("{} from {}", tool, name);
            server
                .register_tool(
                    ToolDescriptor::new(*tool, format!("{} ({})", tool, name)),
                    handler_fn(move |_| {
                        let text = text.clone();
                        async move { CallToolResult::text(text) }
                    }),
                )
                .unwrap();
        }
        Arc::new(server)
    }

    /// Provider that hangs up before the handshake
    struct BrokenProvider;

    impl ToolProvider for BrokenProvider {
        fn name(&self) -> &str {
            "broken"
        }

        fn connect(self: Arc<Self>, end: ChannelEnd) -> ServerConnection {
            end.close();
            ServerConnection::new("broken", tokio::spawn(async { 0 }))
        }
    }

    #[tokio::test]
    async fn test_merges_catalogs_in_order() {
        let registry = ToolRegistry::federate(vec![
            provider("time", &["get-current-time"]),
            provider("weather", &["get-weather"]),
        ])
        .await;

        let names: Vec<_> = registry.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["get-current-time", "get-weather"]);
        assert_eq!(registry.provider_for("get-weather"), Some("weather"));

        let result = registry
            .call("get-current-time", ToolArguments::new())
            .await
            .unwrap();
        assert_eq!(result.text_content(), "get-current-time from time");
    }

    #[tokio::test]
    async fn test_last_provider_wins_on_collision() {
        let registry = ToolRegistry::federate(vec![
            provider("a", &["search", "only-a"]),
            provider("b", &["search"]),
        ])
        .await;

        let result = registry.call("search", ToolArguments::new()).await.unwrap();
        assert_eq!(result.text_content(), "search from b");
        assert_eq!(registry.provider_for("search"), Some("b"));

        // Position of the first registration, descriptor of the winner
        let tools = registry.tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "search");
        assert_eq!(tools[0].description, "search (b)");

        let stats = registry.stats();
        assert_eq!(stats.shadowed_tools, 1);
        assert_eq!(stats.tools_per_provider.get("a"), Some(&1));
        assert_eq!(stats.tools_per_provider.get("b"), Some(&1));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_not_found() {
        let registry = ToolRegistry::federate(vec![provider("time", &["now"])]).await;

        assert_eq!(
            registry.call("nope", ToolArguments::new()).await,
            Err(FederationError::ToolNotFound("nope".into()))
        );
        assert_eq!(
            ToolCatalogPort::call_tool(&registry, "nope", ToolArguments::new()).await,
            Err(CatalogError::ToolNotFound("nope".into()))
        );
    }

    #[tokio::test]
    async fn test_failed_provider_is_skipped() {
        let registry = ToolRegistry::federate(vec![
            provider("time", &["now"]),
            Arc::new(BrokenProvider),
            provider("weather", &["forecast"]),
        ])
        .await;

        assert_eq!(registry.tools().len(), 2);
        assert_eq!(registry.failures().len(), 1);
        assert_eq!(registry.failures()[0].provider, "broken");
        assert_eq!(
            registry.failures()[0].error,
            FederationError::TransportClosed
        );
        assert_eq!(registry.stats().failed_providers, 1);
        assert_eq!(registry.close().await, Ok(2));
    }

    #[tokio::test]
    async fn test_concurrent_close_closes_each_client_once() {
        let registry = Arc::new(
            ToolRegistry::federate(vec![
                provider("a", &["one"]),
                provider("b", &["two"]),
                provider("c", &["three"]),
            ])
            .await,
        );

        let first = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move { registry.close().await }
        });
        let second = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move { registry.close().await }
        });

        assert_eq!(first.await.unwrap(), Ok(3));
        assert_eq!(second.await.unwrap(), Ok(3));
        assert_eq!(registry.close().await, Ok(3));

        for handle in &registry.providers {
            assert!(!handle.client.is_connected());
            assert_eq!(handle.client.close().await, Ok(false));
        }
        assert_eq!(
            registry.call("one", ToolArguments::new()).await,
            Err(FederationError::TransportClosed)
        );
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = ToolRegistry::federate(Vec::new()).await;
        assert!(registry.tools().is_empty());
        assert_eq!(registry.stats().total_providers, 0);
        assert_eq!(registry.close().await, Ok(0));
    }

    #[test]
    fn test_close_error_lists_every_failure() {
        let err = RegistryCloseError {
            failures: vec![
                ("a".into(), FederationError::Shutdown("a: panicked".into())),
                ("b".into(), FederationError::TransportClosed),
            ],
        };
        assert_eq!(
            err.to_string(),
            "failed to close 2 provider(s): a: Task shutdown failed: a: panicked; b: Transport closed"
        );
    }
}
