//! Recovery of a task list from free-form generator output.
//!
//! The generator is asked for a JSON array but often wraps it in prose,
//! drops an opening brace between objects, or stops mid-array. Parsing
//! runs an ordered pipeline of pure text passes; the candidate is decoded
//! after each pass and the pipeline stops at the first success. Nothing
//! here returns an error: an unusable reply is an empty task list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::task::Task;

/// `},` followed by a `"title"` key whose opening brace went missing.
static ORPHANED_TITLE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"\},\s*"title""#).ok());

/// A single repair step. Returns `None` when it does not apply.
pub struct RepairPass {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<String>,
}

/// Repair passes, in the order they are tried.
pub const REPAIR_PASSES: [RepairPass; 2] = [
    RepairPass { name: "restore-object-boundary", apply: restore_object_boundary },
    RepairPass { name: "close-truncated-array", apply: close_truncated_array },
];

/// Extract the task list from generator output.
///
/// Every returned task has a non-empty title.
pub fn parse_task_list(text: &str) -> Vec<Task> {
    let Some(span) = array_span(text) else {
        tracing::warn!("No JSON array found in generator output");
        return Vec::new();
    };

    // A `]` inside the last complete task can end the span early when the
    // outer array was cut off, so fall back to the span running to the end.
    let elements = decode_with_repairs(span).or_else(|| {
        let tail = open_span(text)?;
        (tail.len() > span.len()).then(|| decode_with_repairs(tail)).flatten()
    });
    let Some(elements) = elements else {
        tracing::warn!(len = span.len(), "Could not repair generator output, treating as no tasks");
        return Vec::new();
    };

    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let task = Task::from_value(element);
            if task.is_none() {
                tracing::warn!(index, "Skipping task without a title");
            }
            task
        })
        .collect()
}

/// The text from the first `[` to the last `]`.
///
/// When no `]` follows the first `[`, the output was cut off and the span
/// runs to the end of the text.
pub fn array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    match text.rfind(']') {
        Some(end) if end > start => Some(&text[start..=end]),
        _ => Some(&text[start..]),
    }
}

/// The text from the first `[` to the end.
fn open_span(text: &str) -> Option<&str> {
    text.find('[').map(|start| &text[start..])
}

fn decode(candidate: &str) -> Option<Vec<Value>> {
    serde_json::from_str(candidate).ok()
}

fn decode_with_repairs(span: &str) -> Option<Vec<Value>> {
    if let Some(elements) = decode(span) {
        return Some(elements);
    }

    let mut candidate = span.to_string();
    for pass in &REPAIR_PASSES {
        let Some(repaired) = (pass.apply)(&candidate) else {
            continue;
        };
        tracing::debug!(pass = pass.name, "Applied repair pass");
        candidate = repaired;
        if let Some(elements) = decode(&candidate) {
            return Some(elements);
        }
    }

    None
}

/// Insert the `{` missing before an orphaned `"title"` key.
pub fn restore_object_boundary(text: &str) -> Option<String> {
    let re = ORPHANED_TITLE.as_ref()?;
    if !re.is_match(text) {
        return None;
    }
    Some(re.replace_all(text, "},\n  {\n    \"title\"").into_owned())
}

/// Cut a truncated array back to its last complete object and close it.
pub fn close_truncated_array(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    if trimmed.ends_with(']') {
        return None;
    }

    let last_close = trimmed.rfind('}').filter(|&i| i > 0)?;
    Some(format!("{}\n]", &trimmed[..=last_close]))
}
