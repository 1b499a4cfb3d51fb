//! Tool server (provider side of a channel).
//!
//! A [`ToolServer`] owns a set of tools and answers JSON-RPC requests
//! arriving on any number of channels. Each [`connect`](ToolProvider::connect)
//! spawns an independent serving task; the only state shared between
//! connections is the immutable tool table.
//!
//! Within one connection every request runs in its own task, so a slow
//! handler never blocks the channel. Responses may therefore leave in a
//! different order than requests arrived; clients correlate them by id.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio::task::{JoinHandle, JoinSet};
use toolbridge_domain::tool::{
    CallToolResult, SchemaValidator, ToolArguments, ToolDescriptor, ToolHandler, ToolValidator,
};
use tracing::{debug, info, trace, warn};

use super::channel::{ChannelEnd, ChannelSender};
use super::error::{FederationError, Result};
use super::protocol::{
    CallToolParams, ImplementationInfo, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, METHOD_CALL_TOOL, METHOD_INITIALIZE, METHOD_LIST_TOOLS,
    Message, RpcError, to_value,
};

/// Something that can serve tools over a channel end.
///
/// [`ToolServer`] is the implementation used everywhere; the trait is the
/// seam the registry federates over.
pub trait ToolProvider: Send + Sync {
    /// Provider name, used in logs and registry stats
    fn name(&self) -> &str;

    /// Attach to one channel end and start serving it
    fn connect(self: Arc<Self>, end: ChannelEnd) -> ServerConnection;
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// A named set of tools
pub struct ToolServer {
    info: ImplementationInfo,
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
    validator: SchemaValidator,
}

impl ToolServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ImplementationInfo::new(name, version),
            tools: Vec::new(),
            by_name: HashMap::new(),
            validator: SchemaValidator,
        }
    }

    pub fn info(&self) -> &ImplementationInfo {
        &self.info
    }

    /// Register a tool.
    ///
    /// Tool names are unique per server; registering a name twice fails
    /// with [`FederationError::DuplicateTool`].
    pub fn register_tool(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<()> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(FederationError::DuplicateTool {
                server: self.info.name.clone(),
                tool: descriptor.name,
            });
        }
        debug!(server = %self.info.name, tool = %descriptor.name, "Registered tool");
        self.by_name
            .insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Builder-style [`register_tool`](Self::register_tool)
    pub fn with_tool(
        mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<Self> {
        self.register_tool(descriptor, handler)?;
        Ok(self)
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    /// Answer one request. Always produces exactly one response.
    pub async fn respond(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;
        trace!(server = %self.info.name, id, method = %request.method, "Handling request");
        match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        }
    }

    /// Invoke a tool directly, bypassing any channel
    pub async fn call(
        &self,
        name: &str,
        arguments: ToolArguments,
    ) -> std::result::Result<CallToolResult, RpcError> {
        self.call_tool(CallToolParams {
            name: name.to_string(),
            arguments,
        })
        .await
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> std::result::Result<Value, RpcError> {
        match method {
            METHOD_INITIALIZE => {
                let params: InitializeParams = decode_params(params)?;
                debug!(
                    server = %self.info.name,
                    client = %params.client_info.name,
                    "Client initialized"
                );
                encode(&InitializeResult {
                    server_info: self.info.clone(),
                })
            }
            METHOD_LIST_TOOLS => encode(&ListToolsResult {
                tools: self.descriptors(),
            }),
            METHOD_CALL_TOOL => {
                let params: CallToolParams = decode_params(params)?;
                let result = self.call_tool(params).await?;
                encode(&result)
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }

    async fn call_tool(
        &self,
        params: CallToolParams,
    ) -> std::result::Result<CallToolResult, RpcError> {
        let Some(&index) = self.by_name.get(&params.name) else {
            return Err(RpcError::tool_not_found(&params.name));
        };
        let tool = &self.tools[index];

        if let Err(e) =
            self.validator
                .validate(&params.name, &tool.descriptor.input_schema, &params.arguments)
        {
            debug!(tool = %params.name, error = %e, "Rejected tool arguments");
            return Ok(CallToolResult::error(e.to_string()));
        }

        match AssertUnwindSafe(tool.handler.call(params.arguments))
            .catch_unwind()
            .await
        {
            Ok(result) => {
                if result.is_error() {
                    debug!(tool = %params.name, "Tool returned an error result");
                }
                Ok(result)
            }
            Err(_) => {
                warn!(server = %self.info.name, tool = %params.name, "Tool handler panicked");
                Ok(CallToolResult::error(format!(
                    "Tool '{}' failed unexpectedly",
                    params.name
                )))
            }
        }
    }

    async fn serve(self: Arc<Self>, end: ChannelEnd) -> u64 {
        let (sender, mut receiver) = end.split();
        let mut in_flight = JoinSet::new();
        let mut served = 0u64;

        loop {
            tokio::select! {
                message = receiver.recv() => match message {
                    Some(Message::Request(request)) => {
                        served += 1;
                        in_flight.spawn(Self::answer(Arc::clone(&self), sender.clone(), request));
                    }
                    Some(Message::Response(response)) => {
                        warn!(server = %self.info.name, id = response.id, "Ignoring unexpected response");
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!(server = %self.info.name, error = %e, "Request task failed");
                    }
                }
            }
        }

        // Channel is closed; nobody can receive the remaining responses
        in_flight.abort_all();
        while in_flight.join_next().await.is_some() {}

        info!(server = %self.info.name, served, "Connection closed");
        served
    }

    async fn answer(server: Arc<Self>, sender: ChannelSender, request: JsonRpcRequest) {
        let response = server.respond(request).await;
        let id = response.id;
        if sender.send(Message::Response(response)).is_err() {
            debug!(server = %server.info.name, id, "Dropping response for closed channel");
        }
    }
}

impl ToolProvider for ToolServer {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn connect(self: Arc<Self>, end: ChannelEnd) -> ServerConnection {
        let name = self.info.name.clone();
        debug!(server = %name, "Connecting server to channel");
        ServerConnection::new(name, tokio::spawn(self.serve(end)))
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
) -> std::result::Result<T, RpcError> {
    serde_json::from_value(params.unwrap_or(Value::Null)).map_err(RpcError::invalid_params)
}

fn encode<T: serde::Serialize>(value: &T) -> std::result::Result<Value, RpcError> {
    to_value(value).map_err(RpcError::internal)
}

/// Handle to one serving task
#[derive(Debug)]
pub struct ServerConnection {
    server: String,
    handle: JoinHandle<u64>,
}

impl ServerConnection {
    pub fn new(server: impl Into<String>, handle: JoinHandle<u64>) -> Self {
        Self {
            server: server.into(),
            handle,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Wait for the serving task to finish (after the channel closes).
    ///
    /// Returns the number of requests served.
    pub async fn join(self) -> Result<u64> {
        self.handle
            .await
            .map_err(|e| FederationError::Shutdown(format!("{}: {}", self.server, e)))
    }
}
