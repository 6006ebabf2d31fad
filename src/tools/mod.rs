//! Tool operations exposed to the agent
//!
//! Every tool returns a [`ToolOutcome`]; failures become structured payloads
//! instead of errors so the host always receives something it can show the agent.

pub mod args;
mod custom;
mod fetch;
mod files;

pub use args::{CustomQueryArgs, FetchLogsArgs, ReadLogsArgs, SaveLogsArgs};

use std::time::Duration;

use serde_json::Value;

use crate::client::QueryExecutor;
use crate::config::Config;
use crate::storage::DatasetStore;

/// Limits applied by `fetch_logs`
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Sample sizes above this are truncated
    pub max_sample_size: usize,
    /// Total attempts including the first
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_sample_size: 250,
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Payload returned to the agent
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub payload: Value,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn success(payload: Value) -> Self {
        Self {
            payload,
            is_error: false,
        }
    }

    pub fn failure(payload: Value) -> Self {
        Self {
            payload,
            is_error: true,
        }
    }
}

/// The retrieval tools, bound to one executor and one dataset directory
pub struct ToolSurface<E> {
    executor: E,
    store: DatasetStore,
    project_id: String,
    policy: FetchPolicy,
}

impl<E: QueryExecutor> ToolSurface<E> {
    pub fn new(executor: E, store: DatasetStore, project_id: impl Into<String>) -> Self {
        Self {
            executor,
            store,
            project_id: project_id.into(),
            policy: FetchPolicy::default(),
        }
    }

    pub fn from_config(config: &Config, executor: E) -> Self {
        Self::new(
            executor,
            DatasetStore::new(&config.output_dir),
            config.project_id.clone(),
        )
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

/// `<prefix>_<tag>_<YYYYMMDD_HHMMSS>.json` with the tag reduced to file-safe characters
pub(crate) fn timestamped_filename(prefix: &str, tag: Option<&str>) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    match tag {
        Some(tag) => format!("{}_{}_{}.json", prefix, file_safe(tag), timestamp),
        None => format!("{}_{}.json", prefix, timestamp),
    }
}

fn file_safe(tag: &str) -> String {
    let cleaned: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "all".to_string()
    } else {
        cleaned
    }
}

/// Records from a BTQL response body; a missing `data` array means no records
pub(crate) fn response_records(body: &Value) -> Vec<Value> {
    body.get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::client::{BtqlError, QueryExecutor};

    /// Executor that replays canned responses and records the queries it saw
    #[derive(Default)]
    pub struct ScriptedExecutor {
        responses: Mutex<VecDeque<Result<Value, BtqlError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        pub fn new(responses: Vec<Result<Value, BtqlError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                queries: Mutex::new(vec![]),
            }
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }

        pub fn calls(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl QueryExecutor for ScriptedExecutor {
        async fn execute(&self, query: &str) -> Result<Value, BtqlError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BtqlError::Network("no scripted response".into())))
        }
    }

    pub fn server_error() -> BtqlError {
        BtqlError::QueryFailed {
            status: 500,
            preview: "Internal Server Error".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamped_filename() {
        let name = timestamped_filename("logs", Some("NOT mini"));
        assert!(name.starts_with("logs_NOT_mini_"));
        assert!(name.ends_with(".json"));
        // logs_NOT_mini_YYYYMMDD_HHMMSS.json
        assert_eq!(name.len(), "logs_NOT_mini_".len() + 15 + ".json".len());

        let name = timestamped_filename("query", None);
        assert!(name.starts_with("query_"));
        assert!(!name.contains("__"));
    }

    #[test]
    fn test_file_safe_tag() {
        assert_eq!(file_safe("gpt-5"), "gpt-5");
        assert_eq!(file_safe("../etc"), "___etc");
        assert_eq!(file_safe(""), "all");
    }

    #[test]
    fn test_response_records() {
        assert_eq!(response_records(&json!({"data": [1, 2]})), vec![json!(1), json!(2)]);
        assert!(response_records(&json!({"rows": [1]})).is_empty());
        assert!(response_records(&json!({"data": "oops"})).is_empty());
    }
}
