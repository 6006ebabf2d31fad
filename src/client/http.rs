use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::{body_preview, BtqlError, QueryExecutor};
use crate::config::Config;

/// HTTP client for the `/btql` endpoint
#[derive(Debug, Clone)]
pub struct BtqlClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    debug: bool,
}

impl BtqlClient {
    pub fn new(config: &Config) -> Result<Self, BtqlError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BtqlError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            debug: config.debug,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/btql", self.api_url)
    }
}

#[async_trait]
impl QueryExecutor for BtqlClient {
    async fn execute(&self, query: &str) -> Result<Value, BtqlError> {
        let api_key = self.api_key.as_deref().ok_or(BtqlError::MissingApiKey)?;

        if self.debug {
            tracing::info!("Executing BTQL query:\n{}", query);
        } else {
            tracing::debug!(chars = query.len(), "Executing BTQL query");
        }

        let payload = serde_json::json!({
            "query": query,
            "fmt": "json",
        });

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BtqlError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| BtqlError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(BtqlError::QueryFailed {
                status: status.as_u16(),
                preview: body_preview(&body),
            });
        }

        if !content_type.contains("application/json") {
            return Err(BtqlError::UnexpectedContentType {
                content_type,
                preview: body_preview(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| BtqlError::Deserialization(e.to_string()))
    }
}
