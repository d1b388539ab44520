//! Records exchanged with the ticket store.
//!
//! The store echoes arguments back on create and returns joined rows on
//! list/get, so every record here deserializes leniently: unknown fields
//! are ignored and most fields are optional.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Priority given to tasks that don't state one.
pub const DEFAULT_PRIORITY: i32 = 3;

/// A team (project namespace) in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team ID
    #[serde(default)]
    pub id: Option<String>,
    /// Team name
    #[serde(default)]
    pub name: String,
    /// Team key (prefix of ticket identifiers)
    #[serde(default)]
    pub key: String,
}

/// A ticket label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label ID
    #[serde(default)]
    pub id: Option<String>,
    /// Label name
    #[serde(default)]
    pub name: String,
    /// Hex color
    #[serde(default)]
    pub color: Option<String>,
}

/// A label the planner creates alongside a new team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: &'static str,
    pub color: &'static str,
}

/// Fixed label catalog created for every new team.
pub const STANDARD_LABELS: [LabelSpec; 7] = [
    LabelSpec { name: "code", color: "#5e6ad2" },
    LabelSpec { name: "test", color: "#4EA7FC" },
    LabelSpec { name: "docs", color: "#26B5CE" },
    LabelSpec { name: "refactor", color: "#F2C94C" },
    LabelSpec { name: "bug", color: "#EB5757" },
    LabelSpec { name: "feature", color: "#6FCF97" },
    LabelSpec { name: "research", color: "#BB6BD9" },
];

/// A user (worker identity) in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email (the worker identity)
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Build a user whose display name is derived from the email.
    pub fn from_email(email: &str) -> Self {
        Self { id: None, name: display_name_from_email(email), email: email.to_string() }
    }
}

/// Derive a display name from an email's local part.
///
/// `alice.smith@x.io` becomes `Alice Smith`.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split('.')
        .filter(|token| !token.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Lifecycle bucket of a ticket, derived from the store's status type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not started (unset, backlog or unstarted)
    Unstarted,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
    /// Canceled
    Canceled,
    /// Any status type this client does not know
    Other(String),
}

impl Lifecycle {
    /// Classify a store status type.
    pub fn from_status_type(status_type: Option<&str>) -> Self {
        match status_type {
            None | Some("backlog" | "unstarted") => Self::Unstarted,
            Some("started") => Self::InProgress,
            Some("completed") => Self::Done,
            Some("canceled" | "cancelled") => Self::Canceled,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Workflow state name used when moving a ticket into this bucket.
    pub fn state_name(&self) -> &str {
        match self {
            Self::Unstarted => "Todo",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Canceled => "Canceled",
            Self::Other(name) => name,
        }
    }
}

/// A ticket as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket ID
    pub id: String,
    /// Human-readable identifier (e.g. "AGT-7")
    #[serde(default)]
    pub identifier: Option<String>,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Description (markdown)
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status type (backlog, unstarted, started, completed, canceled)
    #[serde(default)]
    pub status_type: Option<String>,
    /// Workflow state name
    #[serde(default)]
    pub status_name: Option<String>,
    /// Assignee identity
    #[serde(default, alias = "assignee_id")]
    pub assignee: Option<String>,
    /// Assignee display name
    #[serde(default)]
    pub assignee_name: Option<String>,
    /// Label names
    #[serde(default, deserialize_with = "label_names")]
    pub labels: Vec<String>,
    /// Priority (1 = urgent .. 4 = low)
    #[serde(default, alias = "priority_value")]
    pub priority: Option<i32>,
    /// Comments (only present on single-ticket reads)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// The lifecycle bucket this ticket is in.
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_status_type(self.status_type.as_deref())
    }

    /// Whether the ticket has not been started yet.
    pub fn is_unstarted(&self) -> bool {
        self.lifecycle() == Lifecycle::Unstarted
    }

    /// Identifier for display, falling back to the ID.
    pub fn display_id(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.id)
    }
}

/// A comment on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID
    #[serde(default)]
    pub id: Option<String>,
    /// Body (markdown)
    #[serde(default)]
    pub body: String,
    /// Author display name
    #[serde(default, alias = "user_name")]
    pub author: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A ticket to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// Team key
    pub team: String,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Assignee identity
    pub assignee: Option<String>,
    /// Label names
    pub labels: Vec<String>,
    /// Priority
    pub priority: i32,
}

/// Filters for listing tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    /// Team key
    pub team: Option<String>,
    /// Assignee identity
    pub assignee: Option<String>,
    /// Workflow state name
    pub state: Option<String>,
}

impl TicketQuery {
    /// Tickets assigned to `assignee` in `team`.
    pub fn assigned(team: impl Into<String>, assignee: impl Into<String>) -> Self {
        Self { team: Some(team.into()), assignee: Some(assignee.into()), state: None }
    }
}

/// Fields to change on an existing ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    /// New workflow state name
    pub state: Option<String>,
    /// New assignee identity
    pub assignee: Option<String>,
}

impl TicketUpdate {
    /// Move the ticket into a lifecycle bucket.
    pub fn transition(to: &Lifecycle) -> Self {
        Self { state: Some(to.state_name().to_string()), assignee: None }
    }
}

/// Accept labels as plain names or as label objects.
fn label_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|label| match label {
            Value::String(name) => Some(name),
            Value::Object(mut map) => match map.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        })
        .collect())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_from_email() {
        assert_eq!(display_name_from_email("alice.smith@x.io"), "Alice Smith");
        assert_eq!(display_name_from_email("bob@x.io"), "Bob");
        assert_eq!(display_name_from_email("CAROL.o@x.io"), "Carol O");
        assert_eq!(display_name_from_email("noatsign"), "Noatsign");
    }

    #[test]
    fn test_user_from_email() {
        let user = User::from_email("alice.smith@local");
        assert_eq!(user.name, "Alice Smith");
        assert_eq!(user.email, "alice.smith@local");
        assert_eq!(user.id, None);
    }

    #[test]
    fn test_lifecycle_buckets() {
        assert_eq!(Lifecycle::from_status_type(None), Lifecycle::Unstarted);
        assert_eq!(Lifecycle::from_status_type(Some("backlog")), Lifecycle::Unstarted);
        assert_eq!(Lifecycle::from_status_type(Some("unstarted")), Lifecycle::Unstarted);
        assert_eq!(Lifecycle::from_status_type(Some("started")), Lifecycle::InProgress);
        assert_eq!(Lifecycle::from_status_type(Some("completed")), Lifecycle::Done);
        assert_eq!(
            Lifecycle::from_status_type(Some("triage")),
            Lifecycle::Other("triage".to_string())
        );
    }

    #[test]
    fn test_transition_state_names() {
        assert_eq!(TicketUpdate::transition(&Lifecycle::InProgress).state.as_deref(), Some("In Progress"));
        assert_eq!(TicketUpdate::transition(&Lifecycle::Done).state.as_deref(), Some("Done"));
    }

    #[test]
    fn test_ticket_from_create_echo() {
        let ticket: Ticket = serde_json::from_value(json!({
            "id": "abc",
            "identifier": "AGT-1",
            "team": "AGT",
            "title": "Write docs",
            "assignee": "w1@x.io",
            "labels": ["docs"],
            "priority": 2
        }))
        .unwrap();
        assert_eq!(ticket.display_id(), "AGT-1");
        assert_eq!(ticket.labels, vec!["docs"]);
        assert_eq!(ticket.priority, Some(2));
        assert!(ticket.is_unstarted());
    }

    #[test]
    fn test_ticket_from_joined_row() {
        let ticket: Ticket = serde_json::from_value(json!({
            "id": "abc",
            "identifier": "AGT-2",
            "title": "Fix bug",
            "description": null,
            "status_type": "started",
            "status_name": "In Progress",
            "assignee_id": "u1",
            "assignee_name": "W One",
            "priority_value": null,
            "labels": [{"id": "l1", "name": "bug", "color": "#EB5757"}],
            "comments": [{"id": "c1", "body": "hi", "user_name": "W One", "created_at": "now"}]
        }))
        .unwrap();
        assert_eq!(ticket.lifecycle(), Lifecycle::InProgress);
        assert_eq!(ticket.assignee.as_deref(), Some("u1"));
        assert_eq!(ticket.labels, vec!["bug"]);
        assert_eq!(ticket.priority, None);
        assert_eq!(ticket.comments[0].author.as_deref(), Some("W One"));
    }

    #[test]
    fn test_ticket_tolerates_null_collections() {
        let ticket: Ticket =
            serde_json::from_value(json!({"id": "x", "labels": null, "comments": null})).unwrap();
        assert!(ticket.labels.is_empty());
        assert!(ticket.comments.is_empty());
        assert_eq!(ticket.display_id(), "x");
    }

    #[test]
    fn test_standard_label_catalog() {
        let names: Vec<_> = STANDARD_LABELS.iter().map(|l| l.name).collect();
        assert_eq!(names, ["code", "test", "docs", "refactor", "bug", "feature", "research"]);
        assert_eq!(STANDARD_LABELS[0].color, "#5e6ad2");
    }
}
