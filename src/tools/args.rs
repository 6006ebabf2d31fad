//! Tool arguments
//!
//! These types are the single source of truth for both argument parsing and the
//! JSON schemas advertised in `tools/list`.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

fn default_sample_size() -> usize {
    150
}

fn default_hours_back() -> u32 {
    48
}

fn default_exclude_first_hours() -> u32 {
    1
}

fn default_span_name_filter() -> String {
    "chat".to_string()
}

fn default_true() -> bool {
    true
}

fn default_custom_limit() -> usize {
    100
}

fn default_read_count() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FetchLogsArgs {
    /// Filter by model: "mini", "NOT mini", "gpt-5", any other substring, or omit for all models
    #[serde(default)]
    pub model_filter: Option<String>,
    /// Number of logs to retrieve (values above 250 are limited to 250)
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// How far back to look for data, in hours
    #[serde(default = "default_hours_back")]
    pub hours_back: u32,
    /// Exclude the most recent N hours (incomplete streaming responses)
    #[serde(default = "default_exclude_first_hours")]
    pub exclude_first_hours: u32,
    /// Substring the span name must contain
    #[serde(default = "default_span_name_filter")]
    pub span_name_filter: String,
    /// Extra equality filters as field: value pairs
    #[serde(default)]
    pub additional_filters: Option<Map<String, Value>>,
    /// Save to a file and return only metadata (recommended)
    #[serde(default = "default_true")]
    pub auto_save_to_file: bool,
    /// Output file name (auto-generated when omitted)
    #[serde(default)]
    pub filename: Option<String>,
}

impl Default for FetchLogsArgs {
    fn default() -> Self {
        Self {
            model_filter: None,
            sample_size: default_sample_size(),
            hours_back: default_hours_back(),
            exclude_first_hours: default_exclude_first_hours(),
            span_name_filter: default_span_name_filter(),
            additional_filters: None,
            auto_save_to_file: true,
            filename: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CustomQueryArgs {
    /// BTQL query text; `from:` and `limit:` clauses are added when missing
    pub query: String,
    /// Limit used when the query has no `limit:` clause
    #[serde(default = "default_custom_limit")]
    pub limit: usize,
    /// Save to a file and return only metadata
    #[serde(default = "default_true")]
    pub auto_save_to_file: bool,
    /// Output file name (auto-generated when omitted)
    #[serde(default)]
    pub filename: Option<String>,
}

impl CustomQueryArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: default_custom_limit(),
            auto_save_to_file: true,
            filename: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadLogsArgs {
    /// Name of a file previously written by fetch_logs or execute_custom_btql
    pub filename: String,
    /// Zero-based index of the first record to return
    #[serde(default)]
    pub start_index: usize,
    /// Number of records to return (max 50)
    #[serde(default = "default_read_count")]
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SaveLogsArgs {
    /// Complete result of an inline fetch_logs call
    pub logs_data: Value,
    /// Output file name (auto-generated when omitted)
    #[serde(default)]
    pub filename: Option<String>,
}
