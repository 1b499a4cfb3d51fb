//! Tool client (consumer side of a channel).
//!
//! A [`ToolClient`] attaches to exactly one channel end for its lifetime.
//! A background reader task owns the receiving half and resolves each
//! pending request through a `oneshot` keyed by request id, so responses
//! may arrive in any order.
//!
//! When the channel closes the reader marks the pending table closed and
//! drops every waiter: outstanding calls fail with
//! [`TransportClosed`](FederationError::TransportClosed) instead of hanging,
//! and later calls fail immediately.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use toolbridge_application::{CatalogError, ToolCatalogPort};
use toolbridge_domain::tool::{CallToolResult, ToolArguments, ToolDescriptor};
use tracing::{debug, trace, warn};

use super::channel::{ChannelEnd, ChannelReceiver, ChannelSender};
use super::error::{FederationError, Result};
use super::protocol::{
    CallToolParams, ImplementationInfo, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, METHOD_CALL_TOOL, METHOD_INITIALIZE, METHOD_LIST_TOOLS,
    Message, to_value,
};

/// Request-response correlation table
#[derive(Default)]
struct PendingRequests {
    waiters: HashMap<u64, oneshot::Sender<JsonRpcResponse>>,
    closed: bool,
}

type SharedPending = Arc<Mutex<PendingRequests>>;

fn lock(pending: &SharedPending) -> std::sync::MutexGuard<'_, PendingRequests> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

struct Connection {
    sender: ChannelSender,
    pending: SharedPending,
    reader: Mutex<Option<JoinHandle<()>>>,
    server_info: OnceLock<ImplementationInfo>,
}

/// Client for one tool provider
pub struct ToolClient {
    info: ImplementationInfo,
    attached: AtomicBool,
    connection: OnceLock<Connection>,
    next_id: AtomicU64,
}

impl ToolClient {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ImplementationInfo::new(name, version),
            attached: AtomicBool::new(false),
            connection: OnceLock::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Attach to a channel end and perform the `initialize` handshake.
    ///
    /// May be called once; a second call fails with
    /// [`FederationError::AlreadyConnected`] and leaves the existing
    /// connection untouched.
    pub async fn connect(&self, end: ChannelEnd) -> Result<ImplementationInfo> {
        if self.attached.swap(true, Ordering::SeqCst) {
            return Err(FederationError::AlreadyConnected);
        }

        let (sender, receiver) = end.split();
        let pending = SharedPending::default();
        let reader = tokio::spawn(Self::reader_loop(receiver, Arc::clone(&pending)));
        let connection = Connection {
            sender,
            pending,
            reader: Mutex::new(Some(reader)),
            server_info: OnceLock::new(),
        };
        if self.connection.set(connection).is_err() {
            return Err(FederationError::AlreadyConnected);
        }

        let params = to_value(&InitializeParams {
            client_info: self.info.clone(),
        })?;
        let result: InitializeResult = self
            .request(METHOD_INITIALIZE, Some(params))
            .await?
            .into_result()?;

        debug!(
            client = %self.info.name,
            server = %result.server_info.name,
            version = %result.server_info.version,
            "Connected to tool server"
        );
        let connection = self.connection()?;
        let _ = connection.server_info.set(result.server_info.clone());
        Ok(result.server_info)
    }

    /// Info reported by the server during the handshake
    pub fn server_info(&self) -> Option<&ImplementationInfo> {
        self.connection.get()?.server_info.get()
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .get()
            .is_some_and(|c| !c.sender.is_closed())
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let result: ListToolsResult = self
            .request(METHOD_LIST_TOOLS, None)
            .await?
            .into_result()?;
        Ok(result.tools)
    }

    pub async fn call_tool(&self, name: &str, arguments: ToolArguments) -> Result<CallToolResult> {
        let params = to_value(&CallToolParams {
            name: name.to_string(),
            arguments,
        })?;
        self.request(METHOD_CALL_TOOL, Some(params))
            .await?
            .into_result()
    }

    /// Close the channel and wait for the reader task.
    ///
    /// Returns `Ok(true)` when this call closed the channel and `Ok(false)`
    /// when it was already closed or never connected.
    pub async fn close(&self) -> Result<bool> {
        let Some(connection) = self.connection.get() else {
            return Ok(false);
        };
        let closed_now = connection.sender.close();

        let reader = connection
            .reader
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(reader) = reader {
            reader
                .await
                .map_err(|e| FederationError::Shutdown(format!("{}: {}", self.info.name, e)))?;
        }

        if closed_now {
            debug!(client = %self.info.name, "Closed tool client");
        }
        Ok(closed_now)
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection.get().ok_or(FederationError::NotConnected)
    }

    /// Send a request and wait for the correlated response
    async fn request(&self, method: &str, params: Option<Value>) -> Result<JsonRpcResponse> {
        let connection = self.connection()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = lock(&connection.pending);
            if pending.closed {
                return Err(FederationError::TransportClosed);
            }
            pending.waiters.insert(id, tx);
        }

        let request = JsonRpcRequest::new(id, method, params);
        if let Err(e) = connection.sender.send(Message::Request(request)) {
            // Clean up the pending entry to prevent leaks
            lock(&connection.pending).waiters.remove(&id);
            return Err(e);
        }

        rx.await.map_err(|_| FederationError::TransportClosed)
    }

    async fn reader_loop(mut receiver: ChannelReceiver, pending: SharedPending) {
        while let Some(message) = receiver.recv().await {
            match message {
                Message::Response(response) => {
                    let waiter = lock(&pending).waiters.remove(&response.id);
                    match waiter {
                        Some(tx) => {
                            trace!(id = response.id, "Routing response");
                            let _ = tx.send(response);
                        }
                        None => debug!(id = response.id, "No pending request for response"),
                    }
                }
                Message::Request(request) => {
                    warn!(method = %request.method, "Ignoring request sent to a client");
                }
            }
        }

        // Reader ended: fail everything still waiting
        let mut pending = lock(&pending);
        pending.closed = true;
        pending.waiters.clear();
    }
}

impl Drop for ToolClient {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.get() {
            connection.sender.close();
        }
    }
}

#[async_trait]
impl ToolCatalogPort for ToolClient {
    async fn list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, CatalogError> {
        Ok(ToolClient::list_tools(self).await?)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: ToolArguments,
    ) -> std::result::Result<CallToolResult, CatalogError> {
        Ok(ToolClient::call_tool(self, name, arguments).await?)
    }
}
