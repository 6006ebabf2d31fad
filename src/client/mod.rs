//! BTQL execution against the Braintrust API

pub mod http;

pub use http::BtqlClient;

use async_trait::async_trait;
use serde_json::Value;

/// Maximum number of response-body characters carried in an error
pub const ERROR_PREVIEW_CHARS: usize = 200;

/// Executes rendered BTQL text and returns the parsed JSON body
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> Result<Value, BtqlError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BtqlError {
    #[error("BRAINTRUST_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("BTQL query failed: {status} - {preview}")]
    QueryFailed { status: u16, preview: String },

    #[error("Expected JSON response but got {content_type:?}. Response preview: {preview}")]
    UnexpectedContentType { content_type: String, preview: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl BtqlError {
    /// Only backend failures whose message mentions "500" are retried.
    pub fn is_transient(&self) -> bool {
        match self {
            BtqlError::QueryFailed { .. } => self.to_string().contains("500"),
            _ => false,
        }
    }
}

/// First [`ERROR_PREVIEW_CHARS`] characters of a response body
pub fn body_preview(body: &str) -> String {
    body.chars().take(ERROR_PREVIEW_CHARS).collect()
}
