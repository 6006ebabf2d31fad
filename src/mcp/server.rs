//! MCP JSON-RPC server over line-delimited stdio

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::prompts::{find_prompt, PROMPTS};
use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
use super::McpError;
use crate::client::QueryExecutor;
use crate::tools::{CustomQueryArgs, FetchLogsArgs, ReadLogsArgs, SaveLogsArgs, ToolOutcome, ToolSurface};

pub const SERVER_NAME: &str = "braintrust-analyzer";

const INSTRUCTIONS: &str = "Braintrust log analysis server. fetch_logs and execute_custom_btql save \
results to JSON files and return only metadata; read the records back with read_logs_from_file \
in batches of at most 50.";

pub struct McpServer<E> {
    tools: ToolSurface<E>,
}

impl<E: QueryExecutor> McpServer<E> {
    pub fn new(tools: ToolSurface<E>) -> Self {
        Self { tools }
    }

    /// Handle one raw line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable JSON-RPC message");
                Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(e)))
            }
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        tracing::debug!(method = %request.method, "Request received");

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::result(id, initialize_result()),
            "ping" => JsonRpcResponse::result(id, json!({})),
            "tools/list" => JsonRpcResponse::result(id, tool_list()),
            "tools/call" => match self.call_tool(request.params).await {
                Ok(outcome) => JsonRpcResponse::result(id, tool_result(outcome)),
                Err(error) => JsonRpcResponse::error(id, error),
            },
            "prompts/list" => JsonRpcResponse::result(
                id,
                json!({ "prompts": PROMPTS.iter().map(|p| p.listing()).collect::<Vec<_>>() }),
            ),
            "prompts/get" => match self.get_prompt(request.params) {
                Ok(result) => JsonRpcResponse::result(id, result),
                Err(error) => JsonRpcResponse::error(id, error),
            },
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };

        Some(response)
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<ToolOutcome, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
        let tool_name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| JsonRpcError::invalid_params("Missing tool name"))?;
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        tracing::info!(tool = tool_name, "Tool call");

        let outcome = match tool_name {
            "fetch_logs" => {
                let args: FetchLogsArgs = parse_args(tool_name, arguments)?;
                self.tools.fetch_logs(args).await
            }
            "execute_custom_btql" => {
                let args: CustomQueryArgs = parse_args(tool_name, arguments)?;
                self.tools.execute_custom_btql(args).await
            }
            "read_logs_from_file" => {
                let args: ReadLogsArgs = parse_args(tool_name, arguments)?;
                self.tools.read_logs_from_file(args)
            }
            "save_logs_to_file" => {
                let args: SaveLogsArgs = parse_args(tool_name, arguments)?;
                self.tools.save_logs_to_file(args)
            }
            unknown => {
                return Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", unknown)));
            }
        };

        Ok(outcome)
    }

    fn get_prompt(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let name = params
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| JsonRpcError::invalid_params("Missing prompt name"))?;

        let prompt = find_prompt(name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown prompt: {}", name)))?;

        Ok(json!({
            "description": prompt.description,
            "messages": [{
                "role": "user",
                "content": {
                    "type": "text",
                    "text": prompt.render(self.tools.project_id()),
                }
            }]
        }))
    }

    /// Serve requests from `reader` until EOF, writing one response per line
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(trimmed).await {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Serve over the process's stdin/stdout
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

fn parse_args<T: DeserializeOwned>(tool_name: &str, arguments: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments).map_err(|e| JsonRpcError::from_validation(tool_name, &e))
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "tools": {},
            "prompts": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": INSTRUCTIONS
    })
}

fn input_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| json!({ "type": "object" }))
}

fn tool_list() -> Value {
    json!({
        "tools": [
            {
                "name": "fetch_logs",
                "description": "Retrieve chat logs from the Braintrust project. By default the logs are saved to a JSON file and only metadata is returned; use read_logs_from_file to analyze them. Sample sizes above 250 are limited to 250.",
                "inputSchema": input_schema::<FetchLogsArgs>(),
            },
            {
                "name": "execute_custom_btql",
                "description": "Execute a custom BTQL query against the project. from: and limit: clauses are added when missing. Results are saved to a file by default.",
                "inputSchema": input_schema::<CustomQueryArgs>(),
            },
            {
                "name": "read_logs_from_file",
                "description": "Read records from a saved dataset file in batches (max 50 per call). Follow next_start_index until has_more is false.",
                "inputSchema": input_schema::<ReadLogsArgs>(),
            },
            {
                "name": "save_logs_to_file",
                "description": "Save an inline fetch_logs result to a JSON file to keep it out of the conversation context.",
                "inputSchema": input_schema::<SaveLogsArgs>(),
            }
        ]
    })
}

fn tool_result(outcome: ToolOutcome) -> Value {
    let text = serde_json::to_string_pretty(&outcome.payload)
        .unwrap_or_else(|_| outcome.payload.to_string());
    json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ],
        "isError": outcome.is_error
    })
}
