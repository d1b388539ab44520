//! Terminal rendering of tickets.

use super::types::{Lifecycle, Ticket};

/// Format a ticket for display.
pub fn format_ticket(ticket: &Ticket, verbose: bool) -> String {
    let state_icon = match ticket.lifecycle() {
        Lifecycle::Unstarted => "○",
        Lifecycle::InProgress => "◐",
        Lifecycle::Done => "●",
        Lifecycle::Canceled => "⊘",
        Lifecycle::Other(_) => "?",
    };

    let priority_icon = match ticket.priority {
        Some(1) => " ⚡",
        Some(2) => " 🔺",
        Some(3) => " ▲",
        Some(4) => " ▽",
        _ => "",
    };

    let labels =
        if ticket.labels.is_empty() { String::new() } else { format!(" [{}]", ticket.labels.join(", ")) };

    let assignee = ticket
        .assignee_name
        .as_deref()
        .or(ticket.assignee.as_deref())
        .map(|a| format!(" → {a}"))
        .unwrap_or_default();

    let mut line = format!(
        "{} {}{} {}{}{}",
        state_icon,
        ticket.display_id(),
        priority_icon,
        ticket.title,
        labels,
        assignee
    );

    if verbose {
        if let Some(status) = ticket.status_name.as_deref() {
            line.push_str(&format!("\n  Status: {status}"));
        }
        if let Some(description) = ticket.description.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!("\n\n  {}", description.replace('\n', "\n  ")));
        }
        if !ticket.comments.is_empty() {
            line.push_str(&format!("\n\n  Comments ({}):", ticket.comments.len()));
            for comment in &ticket.comments {
                let author = comment.author.as_deref().unwrap_or("unknown");
                line.push_str(&format!("\n  ── {author}\n    {}", comment.body.replace('\n', "\n    ")));
            }
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ticket() -> Ticket {
        serde_json::from_value(json!({
            "id": "t1",
            "identifier": "AGT-42",
            "title": "Test ticket",
            "description": "First line\nSecond line",
            "status_type": "started",
            "status_name": "In Progress",
            "assignee_name": "Worker One",
            "labels": ["bug"],
            "priority": 2,
            "comments": [{"body": "🤖 starting", "user_name": "Worker One"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_format_ticket() {
        let line = format_ticket(&ticket(), false);
        assert_eq!(line, "◐ AGT-42 🔺 Test ticket [bug] → Worker One");
    }

    #[test]
    fn test_format_ticket_verbose() {
        let text = format_ticket(&ticket(), true);
        assert!(text.contains("Status: In Progress"));
        assert!(text.contains("  First line\n  Second line"));
        assert!(text.contains("Comments (1):"));
        assert!(text.contains("── Worker One"));
    }

    #[test]
    fn test_format_minimal_ticket() {
        let ticket: Ticket = serde_json::from_value(json!({"id": "t2", "title": "Bare"})).unwrap();
        assert_eq!(format_ticket(&ticket, true), "○ t2 Bare");
    }
}
