//! MCP client over streamable HTTP.
//!
//! Owns the request-id counter and the session token issued by the store.
//! Every method that talks to the server takes `&mut self`, so a single
//! client instance never has more than one call in flight.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{Map, Value};

use super::protocol::{
    CallToolParams, CallToolResult, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    MCPInitializeParams,
};

/// Header carrying the session token in both directions.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for MCP transport operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server-reported error, carried verbatim.
    #[error("MCP error: {0}")]
    Rpc(Value),

    #[error("Malformed response (HTTP {status}): {body}")]
    MalformedResponse { status: u16, body: String },

    #[error("Tool payload is not valid JSON: {0}")]
    Payload(String),

    #[error("Invalid session header: {0}")]
    InvalidHeader(String),

    #[error("Handshake must be performed before invoking {0}")]
    NotInitialized(String),

    #[error("Handshake already performed on this client")]
    AlreadyInitialized,
}

/// Result type for MCP transport operations.
pub type McpResult<T> = Result<T, McpError>;

/// Session-stateful JSON-RPC client for a single MCP endpoint.
pub struct McpHttpClient {
    /// Endpoint URL (e.g. `http://localhost:3335/mcp`)
    endpoint: String,
    /// HTTP client (no idle connections are kept between calls)
    http: reqwest::Client,
    /// Last request ID handed out
    request_id: i64,
    /// Session token captured from the server, if any
    session_id: Option<String>,
    /// Whether the handshake has completed
    initialized: bool,
}

impl McpHttpClient {
    /// Create a client with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> McpResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a client with a specific per-call timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> McpResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).pool_max_idle_per_host(0).build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
            request_id: 0,
            session_id: None,
            initialized: false,
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the current session token.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Check if the handshake has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The id used by the most recent request (0 before any request).
    pub fn last_request_id(&self) -> i64 {
        self.request_id
    }

    /// Perform the MCP handshake.
    ///
    /// Must be called exactly once, before any [`invoke`](Self::invoke).
    /// A missing session token is not an error; the client stays sessionless.
    pub async fn handshake(&mut self) -> McpResult<Value> {
        if self.initialized {
            return Err(McpError::AlreadyInitialized);
        }

        let params = serde_json::to_value(MCPInitializeParams::default())?;
        let result = self.send("initialize", params).await?;
        self.initialized = true;

        match self.session_id.as_deref() {
            Some(session) => tracing::info!(endpoint = %self.endpoint, session, "Connected to ticket store"),
            None => tracing::warn!(endpoint = %self.endpoint, "Ticket store issued no session, continuing without one"),
        }

        if let Err(e) = self.notify("notifications/initialized").await {
            tracing::debug!(error = %e, "Initialized notification was not accepted");
        }

        Ok(result)
    }

    /// Invoke a JSON-RPC method and return its result mapping.
    pub async fn invoke(&mut self, method: &str, params: Value) -> McpResult<Value> {
        if !self.initialized {
            return Err(McpError::NotInitialized(method.to_string()));
        }
        self.send(method, params).await
    }

    /// Call a named tool and decode its embedded JSON payload.
    pub async fn call_tool(&mut self, name: &str, arguments: Map<String, Value>) -> McpResult<Value> {
        let params = serde_json::to_value(CallToolParams { name: name.to_string(), arguments })?;
        let result = self.invoke("tools/call", params).await?;
        decode_tool_result(result)
    }

    fn headers(&self) -> McpResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/event-stream"));

        if let Some(ref session) = self.session_id {
            let value = HeaderValue::from_str(session)
                .map_err(|_| McpError::InvalidHeader(session.clone()))?;
            headers.insert(SESSION_HEADER, value);
        }

        Ok(headers)
    }

    fn capture_session(&mut self, headers: &HeaderMap) {
        if let Some(session) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
            if self.session_id.as_deref() != Some(session) {
                tracing::debug!(session, "Captured session id");
                self.session_id = Some(session.to_string());
            }
        }
    }

    /// Send a request and wait for its response.
    async fn send(&mut self, method: &str, params: Value) -> McpResult<Value> {
        self.request_id += 1;
        let request = JsonRpcRequest::new(self.request_id, method, params);

        let request_json = serde_json::to_string(&request)?;
        tracing::debug!("MCP <- {}", request_json);

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.headers()?)
            .body(request_json)
            .send()
            .await?;

        self.capture_session(response.headers());

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("MCP -> {}", body.trim());

        let message = parse_response_body(&body).ok_or_else(|| McpError::MalformedResponse {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        })?;

        into_result(message)
    }

    /// Send a notification. The response body is ignored.
    async fn notify(&mut self, method: &str) -> McpResult<()> {
        let notification = JsonRpcNotification::new(method);

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&notification)
            .send()
            .await?;

        self.capture_session(response.headers());
        Ok(())
    }
}

/// Turn a decoded response into its result mapping.
///
/// Servers running without a session spread the result fields into the
/// top-level object instead of nesting them under `result`.
fn into_result(message: JsonRpcResponse) -> McpResult<Value> {
    if let Some(error) = message.error {
        return Err(McpError::Rpc(error));
    }

    Ok(match message.result {
        Some(result) => result,
        None => Value::Object(message.extra),
    })
}

/// Parse a response body delivered either as plain JSON or as server-sent events.
pub fn parse_response_body(body: &str) -> Option<JsonRpcResponse> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).ok();
    }

    // SSE: events are separated by blank lines, payload lines start with `data:`
    let mut data = String::new();
    for line in body.lines().chain(std::iter::once("")) {
        if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.trim_start());
        } else if line.trim().is_empty() && !data.is_empty() {
            if let Ok(message) = serde_json::from_str::<JsonRpcResponse>(&data) {
                return Some(message);
            }
            data.clear();
        }
    }

    None
}

/// Decode the secondary payload embedded in a `tools/call` result.
///
/// A missing or empty payload decodes to an empty mapping.
pub fn decode_tool_result(result: Value) -> McpResult<Value> {
    let result: CallToolResult = serde_json::from_value(result)?;

    if result.is_error == Some(true) {
        tracing::debug!("Tool reported isError");
    }

    match result.text_payload().map(str::trim) {
        None | Some("") => Ok(Value::Object(Map::new())),
        Some(text) => serde_json::from_str(text).map_err(|e| McpError::Payload(e.to_string())),
    }
}
