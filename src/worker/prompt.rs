//! Execution prompt and the comments a worker posts.

/// System prompt for task execution.
pub const WORKER_SYSTEM_PROMPT: &str = r"You are a developer agent. Execute the assigned task precisely.

Guidelines:
1. Read the task description carefully
2. Execute the required work (code, test, docs, etc.)
3. Report what you accomplished
4. Be concise but thorough

If the task involves code:
- Write clean, well-documented code
- Follow best practices
- Include error handling

Output a brief summary of what you did at the end.";

/// Task prompt for one ticket.
pub fn task_prompt(title: &str, description: &str) -> String {
    format!(
        "Execute this task:\n\n**Title**: {title}\n\n**Description**:\n{description}\n\n\
         Complete this task and report what you accomplished."
    )
}

/// Comment posted when a worker starts a ticket.
pub fn start_comment(worker: &str) -> String {
    format!("🤖 Worker `{worker}` starting task...")
}

/// Comment posted when a worker finishes a ticket.
pub fn completion_comment(worker: &str, summary: &str) -> String {
    format!("✅ Task completed by `{worker}`\n\n**Result:**\n{summary}")
}

/// Summary recorded when execution fails.
pub fn error_summary(error: &anyhow::Error) -> String {
    format!("Error: {error:#}")
}

/// Keep at most `limit` characters of a summary.
pub fn truncate_summary(summary: &str, limit: usize) -> &str {
    match summary.char_indices().nth(limit) {
        Some((end, _)) => &summary[..end],
        None => summary,
    }
}
