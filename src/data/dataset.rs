//! Dataset documents persisted by the retrieval tools

use serde::{Deserialize, Serialize};

/// Query bookkeeping stored alongside the records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingInfo {
    pub requested: usize,
    pub returned: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_hours: Option<String>,
    #[serde(default)]
    pub model_filter: Option<String>,
    #[serde(default)]
    pub pagination_note: Option<String>,
    /// Number of retries needed, `None` when the first attempt succeeded
    #[serde(default)]
    pub retries: Option<u32>,
}

/// A query result as written to disk
///
/// `fetch_logs` sets `sample_size`, custom queries set `record_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset<R> {
    pub query_executed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    pub total_available: usize,
    pub records: Vec<R>,
    pub sampling_info: SamplingInfo,
}

impl<R> Dataset<R> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
