//! MCP (Model Context Protocol) transport.
//!
//! The ticket store is reached over MCP's streamable HTTP transport:
//! JSON-RPC 2.0 requests are POSTed to a single endpoint, responses come
//! back as plain JSON or as server-sent events, and the server may hand
//! out a session token that must accompany every later request.
//!
//! ```text
//!  McpHttpClient                         ticket store
//!  ─────────────                         ────────────
//!  handshake()  ── initialize ─────────▶
//!               ◀─ result + mcp-session-id
//!               ── notifications/initialized ─▶
//!  call_tool()  ── tools/call (session) ─▶
//!               ◀─ content[0].text = "{...}"
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agentic_pm::mcp::McpHttpClient;
//!
//! let mut client = McpHttpClient::new("http://localhost:3335/mcp")?;
//! client.handshake().await?;
//!
//! let mut args = serde_json::Map::new();
//! args.insert("team".into(), "AGT".into());
//! let payload = client.call_tool("list_issues", args).await?;
//! ```

mod client;
mod protocol;

pub use client::{
    decode_tool_result, parse_response_body, McpError, McpHttpClient, McpResult, DEFAULT_TIMEOUT,
    SESSION_HEADER,
};
pub use protocol::{
    CallToolParams, CallToolResult, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    MCPClientInfo, MCPInitializeParams, ToolContent, PROTOCOL_VERSION,
};
