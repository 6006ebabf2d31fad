//! Braintrust Analyzer MCP server
//!
//! Run with: cargo run
//!
//! Speaks MCP over stdin/stdout; logs go to stderr.
//!
//! Environment variables (a `.env` file in the working directory is honored):
//! - BRAINTRUST_API_KEY: API credential (required for queries)
//! - BRAINTRUST_API_URL: API base URL (default: https://api.braintrust.dev)
//! - BRAINTRUST_PROJECT_ID: Project to query
//! - BRAINTRUST_OUTPUT_DIR: Where datasets are saved (default: .)
//! - BRAINTRUST_TIMEOUT_SECS: Request timeout (default: 30)
//! - DEBUG: "1" logs every executed query and raises the default filter to debug
//! - RUST_LOG: Log filter (overrides DEBUG)

use braintrust_analyzer::client::BtqlClient;
use braintrust_analyzer::mcp::McpServer;
use braintrust_analyzer::tools::ToolSurface;
use braintrust_analyzer::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let default_filter = if config.debug {
        "braintrust_analyzer=debug"
    } else {
        "braintrust_analyzer=info"
    };

    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        api_url = %config.api_url,
        project_id = %config.project_id,
        output_dir = %config.output_dir.display(),
        timeout_secs = config.timeout.as_secs(),
        "Starting braintrust-analyzer"
    );

    if !config.has_api_key() {
        tracing::warn!("BRAINTRUST_API_KEY is not set; queries will fail until it is provided");
    }

    let client = BtqlClient::new(&config)?;
    let server = McpServer::new(ToolSurface::from_config(&config, client));

    server.run_stdio().await?;

    Ok(())
}
