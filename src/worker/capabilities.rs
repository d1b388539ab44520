//! Tool permissions derived from ticket labels.

/// Tools every task may use.
pub const BASE_TOOLS: [&str; 2] = ["Read", "Bash"];

/// Tools granted to tasks that change files.
pub const WRITE_TOOLS: [&str; 2] = ["Write", "Edit"];

/// Labels that mark a task as changing files.
pub const WRITE_LABELS: [&str; 5] = ["code", "feature", "bug", "test", "docs"];

/// Tools the executor may use for a ticket with these labels.
pub fn allowed_tools(labels: &[String]) -> Vec<String> {
    let mut tools: Vec<String> = BASE_TOOLS.iter().map(|t| (*t).to_string()).collect();

    let writes = labels.iter().any(|label| WRITE_LABELS.contains(&label.trim().to_lowercase().as_str()));
    if writes {
        tools.extend(WRITE_TOOLS.iter().map(|t| (*t).to_string()));
    }

    tools
}
