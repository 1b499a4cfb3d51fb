//! JSON-RPC protocol types for provider channels.
//!
//! Messages keep the JSON-RPC 2.0 shape so an in-process channel can be
//! swapped for a wire transport, but they travel as Rust values: `params`
//! and `result` are `serde_json::Value` trees, never encoded to text.
//!
//! # Methods
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `initialize` | [`InitializeParams`] | [`InitializeResult`] |
//! | `tools/list` | none | [`ListToolsResult`] |
//! | `tools/call` | [`CallToolParams`] | [`CallToolResult`] |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolbridge_domain::tool::{ToolArguments, ToolDescriptor};

pub use toolbridge_domain::tool::CallToolResult;

use super::error::{FederationError, Result};

pub const JSONRPC_VERSION: &str = "2.0";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_LIST_TOOLS: &str = "tools/list";
pub const METHOD_CALL_TOOL: &str = "tools/call";

/// JSON-RPC error codes
pub mod error_codes {
    pub const INVALID_PARAMS: i64 = -32602;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const TOOL_NOT_FOUND: i64 = -32001;
}

/// Anything that can travel over a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
}

/// JSON-RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Decode the result payload, or convert the error object
    pub fn into_result<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        let result = self.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|e| FederationError::UnexpectedResponse(e.to_string()))
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(message: impl std::fmt::Display) -> Self {
        Self::new(
            error_codes::INVALID_PARAMS,
            format!("Invalid params: {}", message),
        )
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message.to_string())
    }

    /// The message carries the bare tool name so clients can rebuild
    /// [`FederationError::ToolNotFound`]
    pub fn tool_not_found(name: &str) -> Self {
        Self::new(error_codes::TOOL_NOT_FOUND, name)
    }
}

impl From<RpcError> for FederationError {
    fn from(error: RpcError) -> Self {
        match error.code {
            error_codes::TOOL_NOT_FOUND => FederationError::ToolNotFound(error.message),
            code => FederationError::Rpc {
                code,
                message: error.message,
            },
        }
    }
}

/// Name and version of a client or server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationInfo {
    pub name: String,
    pub version: String,
}

impl ImplementationInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub client_info: ImplementationInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub server_info: ImplementationInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

/// Encode a params/result struct as a JSON value
pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| FederationError::UnexpectedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let params = CallToolParams {
            name: "get-weather".into(),
            arguments: json!({"name": "東京"}).as_object().cloned().unwrap(),
        };
        let request = JsonRpcRequest::new(7, METHOD_CALL_TOOL, Some(to_value(&params).unwrap()));

        assert_eq!(
            serde_json::to_value(Message::Request(request)).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": {"name": "get-weather", "arguments": {"name": "東京"}}
            })
        );
    }

    #[test]
    fn test_list_request_omits_params() {
        let request = JsonRpcRequest::new(1, METHOD_LIST_TOOLS, None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("params").is_none());
    }

    #[test]
    fn test_message_untagged_deserialize() {
        let msg: Message =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 3, "result": {"tools": []}}))
                .unwrap();
        assert!(matches!(msg, Message::Response(JsonRpcResponse { id: 3, .. })));

        let msg: Message =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 4, "method": "tools/list"}))
                .unwrap();
        assert!(matches!(msg, Message::Request(JsonRpcRequest { id: 4, .. })));
    }

    #[test]
    fn test_into_result_decodes_payload() {
        let response = JsonRpcResponse::success(
            1,
            json!({"serverInfo": {"name": "time", "version": "1.0.0"}}),
        );
        let result: InitializeResult = response.into_result().unwrap();
        assert_eq!(result.server_info.name, "time");
    }

    #[test]
    fn test_tool_not_found_error_maps() {
        let response = JsonRpcResponse::failure(1, RpcError::tool_not_found("nope"));
        let err = response.into_result::<CallToolResult>().unwrap_err();
        assert_eq!(err, FederationError::ToolNotFound("nope".into()));
    }

    #[test]
    fn test_other_rpc_error_maps() {
        let response = JsonRpcResponse::failure(1, RpcError::method_not_found("tools/remove"));
        let err = response.into_result::<Value>().unwrap_err();
        assert!(matches!(
            err,
            FederationError::Rpc { code: error_codes::METHOD_NOT_FOUND, .. }
        ));
    }

    #[test]
    fn test_result_shape_mismatch() {
        let response = JsonRpcResponse::success(1, json!({"unexpected": true}));
        let err = response.into_result::<ListToolsResult>().unwrap_err();
        assert!(matches!(err, FederationError::UnexpectedResponse(_)));
    }
}
