//! MCP (Model Context Protocol) server
//!
//! Exposes the retrieval tools and static prompts to an agent host via
//! JSON-RPC over stdio.

pub mod prompts;
pub mod protocol;
pub mod server;

pub use server::McpServer;

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
