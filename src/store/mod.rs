//! Ticket store facade.
//!
//! Typed, tool-named operations over the store's MCP tool surface. The
//! planner and the worker only ever talk to a [`TicketStore`], so tests can
//! swap in an in-memory store.

mod client;
mod format;
mod types;

use async_trait::async_trait;

pub use client::{McpTicketStore, ToolEnvelope};
pub use format::format_ticket;
pub use types::{
    display_name_from_email, Comment, Label, LabelSpec, Lifecycle, NewTicket, Team, Ticket,
    TicketQuery, TicketUpdate, User, DEFAULT_PRIORITY, STANDARD_LABELS,
};

use crate::mcp::McpError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The call never produced a store verdict.
    #[error("Transport error: {0}")]
    Transport(#[from] McpError),

    /// The store answered with `success: false`.
    #[error("{tool} rejected: {message}")]
    Rejected { tool: String, message: String },

    /// The store answered, but not in a shape this client understands.
    #[error("Unexpected {tool} response: {reason}")]
    UnexpectedPayload { tool: String, reason: String },
}

impl StoreError {
    /// Whether the failure happened below the store (network, protocol).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the store rejected a create because the record exists.
    pub fn is_duplicate(&self) -> bool {
        match self {
            Self::Rejected { message, .. } => message.to_lowercase().contains("already exists"),
            _ => false,
        }
    }
}

/// Outcome of a create-if-absent call.
#[derive(Debug)]
pub enum CreateOutcome<T> {
    /// A new record was created.
    Created(T),
    /// The record was already there.
    AlreadyExisted,
    /// The create failed for another reason.
    Failed(StoreError),
}

impl<T> CreateOutcome<T> {
    /// Classify the result of a create call.
    pub fn from_result(result: StoreResult<T>) -> Self {
        match result {
            Ok(value) => Self::Created(value),
            Err(e) if e.is_duplicate() => Self::AlreadyExisted,
            Err(e) => Self::Failed(e),
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// `Some` when created, `None` when it already existed.
    pub fn into_result(self) -> StoreResult<Option<T>> {
        match self {
            Self::Created(value) => Ok(Some(value)),
            Self::AlreadyExisted => Ok(None),
            Self::Failed(e) => Err(e),
        }
    }
}

/// Typed access to the ticket store.
///
/// Methods take `&mut self`: a store handle serves one call at a time.
#[async_trait]
pub trait TicketStore: Send {
    /// Create a team, or report that it exists.
    async fn create_team(&mut self, name: &str, key: &str) -> CreateOutcome<Team>;

    /// List all teams.
    async fn list_teams(&mut self) -> StoreResult<Vec<Team>>;

    /// Create a label in a team, or report that it exists.
    async fn create_label(&mut self, team: &str, label: &LabelSpec) -> CreateOutcome<Label>;

    /// Create a user, or report that it exists.
    async fn create_user(&mut self, name: &str, email: &str) -> CreateOutcome<User>;

    /// List all users.
    async fn list_users(&mut self) -> StoreResult<Vec<User>>;

    /// Create a ticket.
    async fn create_ticket(&mut self, ticket: &NewTicket) -> StoreResult<Ticket>;

    /// List tickets matching the query, in store order.
    async fn list_tickets(&mut self, query: &TicketQuery) -> StoreResult<Vec<Ticket>>;

    /// Read one ticket with its labels and comments.
    async fn get_ticket(&mut self, id: &str) -> StoreResult<Ticket>;

    /// Change a ticket's state and/or assignee.
    async fn update_ticket(&mut self, id: &str, update: &TicketUpdate) -> StoreResult<()>;

    /// Add a comment to a ticket.
    async fn create_comment(&mut self, ticket_id: &str, body: &str) -> StoreResult<Comment>;
}
