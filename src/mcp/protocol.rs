//! MCP Protocol types.
//!
//! JSON-RPC 2.0 envelopes and the subset of Model Context Protocol messages
//! the ticket store speaks: `initialize` and `tools/call`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version offered during the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID
    pub id: i64,
    /// Method name
    pub method: String,
    /// Parameters
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request.
    pub fn new(id: i64, method: impl Into<String>, params: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, method: method.into(), params }
    }
}

/// JSON-RPC 2.0 notification (no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Method name
    pub method: String,
    /// Parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a notification without parameters.
    pub fn new(method: impl Into<String>) -> Self {
        Self { jsonrpc: "2.0".to_string(), method: method.into(), params: None }
    }
}

/// JSON-RPC 2.0 response.
///
/// The `id` is kept for logging only; callers never correlate it with the
/// request. `error` is held as raw JSON because the store does not always
/// follow the `{code, message}` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    #[serde(default)]
    pub jsonrpc: String,
    /// Request ID echoed by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Result (if successful)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (if failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    /// Any other top-level fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JsonRpcResponse {
    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// ============================================================================
// MCP-specific message types
// ============================================================================

/// MCP initialize request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MCPInitializeParams {
    /// Protocol version
    pub protocol_version: String,
    /// Client capabilities (this client advertises none)
    pub capabilities: Map<String, Value>,
    /// Client info
    pub client_info: MCPClientInfo,
}

impl Default for MCPInitializeParams {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: Map::new(),
            client_info: MCPClientInfo {
                name: crate::APP_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// MCP client info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPClientInfo {
    /// Client name
    pub name: String,
    /// Client version
    pub version: String,
}

/// Parameters for calling a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Tool name
    pub name: String,
    /// Tool arguments
    pub arguments: Map<String, Value>,
}

/// Result from calling a tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Content returned by the tool
    #[serde(default)]
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// The embedded text payload, if the first content block carries one.
    pub fn text_payload(&self) -> Option<&str> {
        self.content.first().and_then(ToolContent::as_text)
    }
}

/// Content from a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content
    Text {
        /// The text content
        text: String,
    },
    /// Resource reference
    Resource {
        /// Resource URI
        uri: String,
        /// Resource text content
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Any content kind this client does not interpret
    #[serde(other)]
    Other,
}

impl ToolContent {
    /// Get text content if this is a text type.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolContent::Text { text } => Some(text),
            ToolContent::Resource { text, .. } => text.as_deref(),
            ToolContent::Other => None,
        }
    }
}
