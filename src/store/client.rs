//! Ticket store reached through MCP tool calls.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::types::{Comment, Label, LabelSpec, NewTicket, Team, Ticket, TicketQuery, TicketUpdate, User};
use super::{CreateOutcome, StoreError, StoreResult, TicketStore};
use crate::mcp::McpHttpClient;

/// The `{success, data}` / `{success: false, error}` envelope every tool returns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ToolEnvelope {
    /// Unwrap the data, turning a store-side failure into [`StoreError::Rejected`].
    pub fn into_data(self, tool: &str) -> StoreResult<Value> {
        if let Some(error) = self.error {
            return Err(StoreError::Rejected { tool: tool.to_string(), message: error_message(error) });
        }
        if self.success == Some(false) {
            return Err(StoreError::Rejected {
                tool: tool.to_string(),
                message: "request failed".to_string(),
            });
        }
        Ok(self.data.unwrap_or(Value::Null))
    }
}

fn error_message(error: Value) -> String {
    match error {
        Value::String(message) => message,
        Value::Object(ref map) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    }
}

fn into_arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// [`TicketStore`] backed by an MCP session.
pub struct McpTicketStore {
    client: McpHttpClient,
}

impl McpTicketStore {
    /// Wrap a client that has already completed its handshake.
    pub fn new(client: McpHttpClient) -> Self {
        Self { client }
    }

    /// Open a session against the store endpoint.
    pub async fn connect(endpoint: &str, timeout: Duration) -> StoreResult<Self> {
        let mut client = McpHttpClient::with_timeout(endpoint, timeout)?;
        client.handshake().await?;
        Ok(Self::new(client))
    }

    /// The underlying transport client.
    pub fn client(&self) -> &McpHttpClient {
        &self.client
    }

    /// Call a store tool and decode the envelope's data.
    async fn call<T: DeserializeOwned>(&mut self, tool: &str, args: Value) -> StoreResult<T> {
        let payload = self.client.call_tool(tool, into_arguments(args)).await?;

        let envelope: ToolEnvelope = serde_json::from_value(payload).map_err(|e| {
            StoreError::UnexpectedPayload { tool: tool.to_string(), reason: e.to_string() }
        })?;
        let data = envelope.into_data(tool)?;

        serde_json::from_value(data).map_err(|e| StoreError::UnexpectedPayload {
            tool: tool.to_string(),
            reason: e.to_string(),
        })
    }

    async fn call_list<T: DeserializeOwned>(&mut self, tool: &str, args: Value) -> StoreResult<Vec<T>> {
        let items: Option<Vec<T>> = self.call(tool, args).await?;
        Ok(items.unwrap_or_default())
    }
}

#[async_trait]
impl TicketStore for McpTicketStore {
    async fn create_team(&mut self, name: &str, key: &str) -> CreateOutcome<Team> {
        CreateOutcome::from_result(self.call("create_team", json!({"name": name, "key": key})).await)
    }

    async fn list_teams(&mut self) -> StoreResult<Vec<Team>> {
        self.call_list("list_teams", json!({})).await
    }

    async fn create_label(&mut self, team: &str, label: &LabelSpec) -> CreateOutcome<Label> {
        let args = json!({"team": team, "name": label.name, "color": label.color});
        let result = self.call::<Option<Label>>("create_issue_label", args).await.map(|created| {
            created.unwrap_or_else(|| Label {
                id: None,
                name: label.name.to_string(),
                color: Some(label.color.to_string()),
            })
        });
        CreateOutcome::from_result(result)
    }

    async fn create_user(&mut self, name: &str, email: &str) -> CreateOutcome<User> {
        let args = json!({"name": name, "email": email});
        let result = self.call::<Option<User>>("create_user", args).await.map(|created| {
            created.unwrap_or_else(|| User { id: None, name: name.to_string(), email: email.to_string() })
        });
        CreateOutcome::from_result(result)
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        self.call_list("list_users", json!({})).await
    }

    async fn create_ticket(&mut self, ticket: &NewTicket) -> StoreResult<Ticket> {
        let mut args = json!({
            "team": ticket.team,
            "title": ticket.title,
            "priority": ticket.priority,
        });
        if !ticket.description.is_empty() {
            args["description"] = json!(ticket.description);
        }
        if let Some(ref assignee) = ticket.assignee {
            args["assignee"] = json!(assignee);
        }
        if !ticket.labels.is_empty() {
            args["labels"] = json!(ticket.labels);
        }

        self.call("create_issue", args).await
    }

    async fn list_tickets(&mut self, query: &TicketQuery) -> StoreResult<Vec<Ticket>> {
        let mut args = json!({});
        if let Some(ref team) = query.team {
            args["team"] = json!(team);
        }
        if let Some(ref assignee) = query.assignee {
            args["assignee"] = json!(assignee);
        }
        if let Some(ref state) = query.state {
            args["state"] = json!(state);
        }

        self.call_list("list_issues", args).await
    }

    async fn get_ticket(&mut self, id: &str) -> StoreResult<Ticket> {
        self.call("get_issue", json!({"id": id})).await
    }

    async fn update_ticket(&mut self, id: &str, update: &TicketUpdate) -> StoreResult<()> {
        let mut args = json!({"id": id});
        if let Some(ref state) = update.state {
            args["state"] = json!(state);
        }
        if let Some(ref assignee) = update.assignee {
            args["assignee"] = json!(assignee);
        }

        let _: Value = self.call("update_issue", args).await?;
        Ok(())
    }

    async fn create_comment(&mut self, ticket_id: &str, body: &str) -> StoreResult<Comment> {
        let created: Option<Comment> =
            self.call("create_comment", json!({"issueId": ticket_id, "body": body})).await?;
        Ok(created.unwrap_or_else(|| Comment {
            id: None,
            body: body.to_string(),
            author: None,
            created_at: None,
        }))
    }
}
