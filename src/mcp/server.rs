/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Dispatches tool calls to the tracker
/// 3. Writes JSON-RPC responses to stdout
///
/// Requests are handled one at a time, so every tracker mutation is
/// serialized.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::mcp::protocol::*;
use crate::tools;
use crate::{HabitTrackerServer, ServerError};

/// Tool definition with an input schema derived from its parameter type
fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let input_schema = serde_json::to_value(schemars::schema_for!(P))
        .unwrap_or_else(|_| json!({"type": "object"}));
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Every tool the server exposes
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool::<tools::CreateHabitParams>(
            "habit_create",
            "Create a habit to track (alcohol, caffeine, sugar or custom)",
        ),
        tool::<tools::UpdateHabitParams>(
            "habit_update",
            "Edit a habit; changing the start date reschedules milestone notifications",
        ),
        tool::<tools::DeleteHabitParams>(
            "habit_delete",
            "Archive a habit, or delete it with its history when permanent is true",
        ),
        tool::<tools::MarkDayParams>(
            "habit_mark_day",
            "Mark a day as success, failure or skip, or clear it with none",
        ),
        tool::<tools::StatusParams>(
            "habit_status",
            "Check current and longest streaks, with optional recent history",
        ),
        tool::<tools::ListHabitsParams>("habit_list", "List habits with their streaks"),
        tool::<tools::NotificationSettingsParams>(
            "habit_notification_settings",
            "Show or change milestone notification time and day counts",
        ),
        tool::<tools::EmptyParams>(
            "app_resume",
            "Run on app foreground: auto-mark today for active habits and advance the fasting cycle",
        ),
        tool::<tools::EmptyParams>("fasting_start", "Start a fast now"),
        tool::<tools::EmptyParams>("fasting_end", "End the fast in progress"),
        tool::<tools::FastingStatusParams>(
            "fasting_status",
            "Current fasting phase and progress, with optional history",
        ),
        tool::<tools::FastingSettingsParams>(
            "fasting_settings",
            "Show or change the fasting schedule and auto-cycling",
        ),
        tool::<tools::DeleteSessionParams>(
            "fasting_delete_session",
            "Remove a fasting session from history",
        ),
    ]
}

fn parse_args<P: DeserializeOwned>(args: Map<String, Value>) -> Result<P, ToolCallResult> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolCallResult::error(format!("Invalid arguments: {}", e)))
}

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitTrackerServer,
    /// Whether the client has confirmed initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The wrapped tracker server
    pub fn habit_tracker(&self) -> &HabitTrackerServer {
        &self.habit_tracker
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and for notifications, which get no
    /// response.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a parsed JSON-RPC request
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.method == "initialized" || request.method == "notifications/initialized" {
            self.initialized = true;
            debug!("Client finished initialization");
            return request
                .id
                .map(|id| JsonRpcResponse::success(id, json!(null)));
        }

        let Some(id) = request.id else {
            debug!("Ignoring notification '{}'", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id).await,
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };
        Some(response)
    }

    /// Handle MCP initialization request
    async fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit & Fasting Tracker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Self::respond(id, &result)
    }

    /// Handle tools/list request
    async fn handle_tools_list(&mut self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": tool_definitions() }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        debug!("Calling tool '{}'", tool_params.name);
        let result = self.call_tool(&tool_params.name, tool_params.arguments);
        Self::respond(id, &result)
    }

    fn call_tool(&mut self, name: &str, args: Map<String, Value>) -> ToolCallResult {
        let tracker = self.habit_tracker.tracker_mut();

        let outcome: Result<String, tools::ToolError> = match name {
            "habit_create" => match parse_args(args) {
                Ok(p) => tools::create_habit(tracker, p).map(|r| r.message),
                Err(e) => return e,
            },
            "habit_update" => match parse_args(args) {
                Ok(p) => tools::update_habit(tracker, p).map(|r| r.message),
                Err(e) => return e,
            },
            "habit_delete" => match parse_args(args) {
                Ok(p) => tools::delete_habit(tracker, p).map(|r| r.message),
                Err(e) => return e,
            },
            "habit_mark_day" => match parse_args(args) {
                Ok(p) => tools::mark_day(tracker, p).map(|r| r.message),
                Err(e) => return e,
            },
            "habit_status" => match parse_args(args) {
                Ok(p) => tools::habit_status(tracker, p).map(|r| r.message),
                Err(e) => return e,
            },
            "habit_list" => match parse_args(args) {
                Ok(p) => Ok(tools::list_habits(tracker, p).message),
                Err(e) => return e,
            },
            "habit_notification_settings" => match parse_args(args) {
                Ok(p) => tools::notification_settings(tracker, p).map(|r| r.message),
                Err(e) => return e,
            },
            "app_resume" => Ok(tools::app_resume(tracker).1),
            "fasting_start" => Ok(tools::start_fast(tracker).message),
            "fasting_end" => Ok(tools::end_fast(tracker).message),
            "fasting_status" => match parse_args(args) {
                Ok(p) => Ok(tools::fasting_status(tracker, p).message),
                Err(e) => return e,
            },
            "fasting_settings" => match parse_args(args) {
                Ok(p) => tools::fasting_settings(tracker, p).map(|r| r.message),
                Err(e) => return e,
            },
            "fasting_delete_session" => match parse_args(args) {
                Ok(p) => tools::delete_session(tracker, p),
                Err(e) => return e,
            },
            _ => return ToolCallResult::error(format!("Unknown tool: {}", name)),
        };

        match outcome {
            Ok(message) => ToolCallResult::success(message),
            Err(e) => {
                debug!("Tool '{}' failed: {}", name, e);
                ToolCallResult::from_tool_error(&e)
            }
        }
    }

    fn respond<T: serde::Serialize>(id: Value, result: &T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize result: {}", e),
                None,
            ),
        }
    }
}
