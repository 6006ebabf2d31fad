//! Braintrust Analyzer: log retrieval tools for agent hosts
//!
//! An MCP server that lets an AI agent pull chat-log samples out of a
//! Braintrust project via BTQL, park them in local JSON files, and read them
//! back in small batches so large datasets never flood the agent's context.
//!
//! # Features
//!
//! - **Structured Fetch**: model, time-window, span and field filters compiled to BTQL
//! - **Custom Queries**: raw BTQL with the source and limit clauses filled in
//! - **File Offload**: results saved to disk with only metadata returned inline
//! - **Batched Reads**: paginated access to saved datasets (max 50 per call)
//! - **Retry**: transient server errors retried with a fixed delay
//!
//! # Example
//!
//! ```no_run
//! use braintrust_analyzer::client::BtqlClient;
//! use braintrust_analyzer::tools::{FetchLogsArgs, ToolSurface};
//! use braintrust_analyzer::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?.with_api_key("sk-...");
//! let tools = ToolSurface::from_config(&config, BtqlClient::new(&config)?);
//!
//! let outcome = tools
//!     .fetch_logs(FetchLogsArgs {
//!         model_filter: Some("mini".to_string()),
//!         ..Default::default()
//!     })
//!     .await;
//! println!("{}", outcome.payload);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod data;
pub mod mcp;
pub mod query;
pub mod storage;
pub mod tools;

// Re-export commonly used types
pub use client::{BtqlClient, BtqlError, QueryExecutor};
pub use config::{Config, ConfigError};
pub use data::{Dataset, LogRecord, SamplingInfo};
pub use mcp::McpServer;
pub use storage::DatasetStore;
pub use tools::{ToolOutcome, ToolSurface};
