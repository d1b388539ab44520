//! Tasks produced by the generator, before they become tickets.

use serde_json::Value;

use crate::store::{NewTicket, DEFAULT_PRIORITY};

/// A task extracted from generator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Title (never empty)
    pub title: String,
    /// Description
    pub description: String,
    /// Label names
    pub labels: Vec<String>,
    /// Priority rank
    pub priority: i32,
}

impl Task {
    /// Create a task with default description, labels and priority.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            labels: Vec::new(),
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Read a task from one decoded array element.
    ///
    /// Returns `None` when the element has no usable title. Other fields
    /// fall back to their defaults when missing or of the wrong type.
    pub fn from_value(value: &Value) -> Option<Self> {
        let title = value.get("title")?.as_str()?.trim();
        if title.is_empty() {
            return None;
        }

        let description = value.get("description").and_then(Value::as_str).unwrap_or_default();

        let labels = match value.get("labels") {
            Some(Value::Array(items)) => {
                items.iter().filter_map(Value::as_str).map(str::to_string).collect()
            }
            Some(Value::String(label)) if !label.is_empty() => vec![label.clone()],
            _ => Vec::new(),
        };

        let priority = match value.get("priority") {
            Some(Value::Number(n)) => n.as_i64().and_then(|p| i32::try_from(p).ok()),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .unwrap_or(DEFAULT_PRIORITY);

        Some(Self { title: title.to_string(), description: description.to_string(), labels, priority })
    }

    /// The ticket to create for this task.
    pub fn to_new_ticket(&self, team: &str, assignee: Option<&str>) -> NewTicket {
        NewTicket {
            team: team.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: assignee.map(str::to_string),
            labels: self.labels.clone(),
            priority: self.priority,
        }
    }
}
