//! Agent-facing log records
//!
//! Raw BTQL rows are reshaped into a flat [`LogRecord`]. The backend schema is not
//! ours, so every lookup degrades to an absent value instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One conversation turn as handed to the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: Option<String>,
    pub user_id: Option<String>,
    /// Conversation messages without system prompts
    pub input: Value,
    pub output: Value,
    pub model: Option<String>,
    pub created: Option<String>,
    pub span_name: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl LogRecord {
    pub fn from_raw(raw: &Value) -> Self {
        let metadata = raw.get("metadata").and_then(Value::as_object);

        let user_id = raw
            .get("userID")
            .and_then(scalar_string)
            .or_else(|| metadata.and_then(|m| m.get("userID")).and_then(scalar_string));

        let model = metadata
            .and_then(|m| m.get("model"))
            .and_then(scalar_string)
            .or_else(|| raw.get("model").and_then(scalar_string));

        let span_name = raw
            .get("span_attributes")
            .and_then(Value::as_object)
            .and_then(|attrs| attrs.get("name"))
            .and_then(scalar_string);

        Self {
            id: raw.get("id").and_then(scalar_string),
            user_id,
            input: strip_system_messages(raw.get("input")),
            output: raw.get("output").cloned().unwrap_or(Value::Null),
            model,
            created: raw.get("created").and_then(scalar_string),
            span_name,
            metadata: metadata.cloned().unwrap_or_default(),
        }
    }
}

/// Format raw backend rows, preserving order
pub fn format_log_records(records: &[Value]) -> Vec<LogRecord> {
    records.iter().map(LogRecord::from_raw).collect()
}

/// Keep only object messages whose role is not `system`. Non-list inputs pass through.
fn strip_system_messages(input: Option<&Value>) -> Value {
    match input {
        Some(Value::Array(messages)) => Value::Array(
            messages
                .iter()
                .filter(|msg| {
                    msg.as_object()
                        .map(|m| m.get("role").and_then(Value::as_str) != Some("system"))
                        .unwrap_or(false)
                })
                .cloned()
                .collect(),
        ),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
