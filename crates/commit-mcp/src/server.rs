//! MCP Server implementation
//!
//! The main server struct that coordinates MCP protocol handling with the
//! git tool dispatcher.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use serde_json::{Value, json};

use crate::handlers::handle_tool_call;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::tools::{ToolDefinition, ToolResult, get_tool_definitions};
use crate::{Error, Result};

/// MCP Server for git operations
///
/// Exposes git status, diff, add, commit, push, pull and log as MCP tools
/// over JSON-RPC 2.0 on stdio. Per-invocation failures are reported inside
/// the tool-result envelope; they never tear down the server.
///
/// # Example
///
/// ```ignore
/// use commit_mcp::CommitMcpServer;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut server = CommitMcpServer::new(PathBuf::from("."));
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct CommitMcpServer {
    /// Fallback repository path when a call omits `repoPath`
    default_root: PathBuf,

    /// Whether the server has been initialized
    initialized: bool,

    /// Available MCP tools
    tools: Vec<ToolDefinition>,
}

impl CommitMcpServer {
    /// Create a new MCP server instance
    ///
    /// # Arguments
    ///
    /// * `default_root` - Fallback repository path for calls without an
    ///   explicit `repoPath` (usually the process working directory)
    pub fn new(default_root: PathBuf) -> Self {
        Self {
            default_root,
            initialized: false,
            tools: Vec::new(),
        }
    }

    /// Initialize the server
    ///
    /// Loads the tool catalog. The fallback root is deliberately not
    /// validated here: repository existence is checked per invocation
    /// against the path the invocation resolves.
    pub async fn initialize(&mut self) -> Result<()> {
        tracing::info!(root = ?self.default_root, "Initializing MCP server");

        self.tools = get_tool_definitions();
        self.initialized = true;
        Ok(())
    }

    /// Run the MCP server
    ///
    /// Starts processing MCP protocol messages over stdin/stdout, one JSON
    /// line per message.
    pub async fn run(&mut self) -> Result<()> {
        self.initialize().await?;

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!("MCP server ready, listening on stdio");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            match self.handle_message(&line).await {
                Ok(response) if !response.is_empty() => {
                    writeln!(stdout, "{}", response)?;
                    stdout.flush()?;
                }
                Ok(_) => {} // No response needed (notifications)
                Err(e) => {
                    let error_response =
                        JsonRpcResponse::error(None, -32603, format!("Internal error: {}", e));
                    let json_str = serde_json::to_string(&error_response)?;
                    writeln!(stdout, "{}", json_str)?;
                    stdout.flush()?;
                }
            }
        }

        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Parses the JSON-RPC request and dispatches to the appropriate handler.
    ///
    /// # Returns
    ///
    /// The JSON-RPC response as a string, or empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = serde_json::from_str(message)?;

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params).await?,
            "initialized" => return Ok(String::new()), // Notification, no response
            "notifications/initialized" => return Ok(String::new()), // Notification, no response
            "tools/list" => self.handle_tools_list(request.id).await?,
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    /// Handle the initialize request
    ///
    /// Logs the connecting client and returns server capabilities and info.
    /// Malformed or absent client params are tolerated; the handshake still
    /// succeeds.
    async fn handle_initialize(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => tracing::info!(
                client = %params.client_info.name,
                version = %params.client_info.version,
                protocol = %params.protocol_version,
                "Client connected"
            ),
            Err(_) => tracing::debug!("Initialize request without client info"),
        }

        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "commit-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    /// Handle tools/list request
    ///
    /// Returns the fixed tool catalog, identical on every call.
    async fn handle_tools_list(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let tools = get_tool_definitions();

        // Convert to the format expected by MCP protocol
        let tools_value: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        Ok(JsonRpcResponse::success(id, json!({ "tools": tools_value })))
    }

    /// Handle tools/call request
    ///
    /// Executes the requested tool. Every dispatcher failure is converted to
    /// an error envelope inside a *successful* JSON-RPC response; nothing
    /// throws past this point.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let tool_params: ToolCallParams = serde_json::from_value(params)?;

        match handle_tool_call(&self.default_root, &tool_params.name, tool_params.arguments).await
        {
            Ok(text) => {
                let tool_result = ToolResult::text(text);
                Ok(JsonRpcResponse::success(
                    id,
                    serde_json::to_value(tool_result)?,
                ))
            }
            Err(e) => {
                let tool_result = ToolResult::error(format!("Error: {}", e));
                Ok(JsonRpcResponse::success(
                    id,
                    serde_json::to_value(tool_result)?,
                ))
            }
        }
    }

    /// Get the fallback repository path
    pub fn default_root(&self) -> &PathBuf {
        &self.default_root
    }

    /// Check if the server is initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get available tools
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}
