use crate::catalog::Catalog;
use crate::pipeline::ConditionsService;
use crate::query::{ConditionsQuery, OutputFormat, QueryError};
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "map-conditions";

pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
}

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::Parse(_) => error_codes::PARSE_ERROR,
            McpError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::Io(_) => error_codes::INVALID_REQUEST,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FormatArgs {
    #[serde(default = "default_format")]
    format: String,
}

#[derive(Debug, Deserialize)]
struct ZoneArgs {
    map_name: String,
    #[serde(default = "default_format")]
    format: String,
}

#[derive(Debug, Deserialize)]
struct ActiveArgs {
    #[serde(default)]
    include_major_only: bool,
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "text".to_string()
}

pub struct McpServer {
    service: ConditionsService,
}

impl McpServer {
    pub fn new(service: ConditionsService) -> Self {
        Self { service }
    }

    pub fn run_stdio(&self) -> Result<(), McpError> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    pub fn run<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<(), McpError> {
        info!("mcp stdio transport started");
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                let mut framed = serde_json::to_string(&response)
                    .map_err(|e| McpError::Parse(e.to_string()))?;
                framed.push('\n');
                writer.write_all(framed.as_bytes())?;
                writer.flush()?;
            }
        }
        info!("eof on stdin, shutting down");
        Ok(())
    }

    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let request: JsonRpcRequest = match serde_json::from_str(line.trim()) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return Some(error_response(Value::Null, &McpError::Parse(e.to_string())));
            }
        };

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification received");
            return None;
        };

        if request.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
            let err = McpError::InvalidRequest("jsonrpc must be \"2.0\"".to_string());
            return Some(error_response(id, &err));
        }

        match self.dispatch(&request) {
            Ok(result) => Some(json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": result })),
            Err(err) => Some(error_response(id, &err)),
        }
    }

    fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value, McpError> {
        match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions(self.service.catalog()) })),
            "tools/call" => self.call_tool(request.params.clone()),
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn call_tool(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;
        let args = params.arguments.unwrap_or_else(|| json!({}));

        let (query, format) = match params.name.as_str() {
            "get_map_conditions" => {
                let args: FormatArgs = parse_args(args)?;
                (ConditionsQuery::All, args.format)
            }
            "get_specific_map_condition" => {
                let args: ZoneArgs = parse_args(args)?;
                (ConditionsQuery::Zone(args.map_name), args.format)
            }
            "get_active_conditions_only" => {
                let args: ActiveArgs = parse_args(args)?;
                (
                    ConditionsQuery::Active {
                        major_only: args.include_major_only,
                    },
                    args.format,
                )
            }
            "get_next_conditions" => {
                let args: FormatArgs = parse_args(args)?;
                (ConditionsQuery::Upcoming, args.format)
            }
            other => return Err(McpError::InvalidParams(format!("Unknown tool: {other}"))),
        };

        info!(tool = %params.name, format = %format, "tool call");
        let outcome = format
            .parse::<OutputFormat>()
            .and_then(|format| self.service.answer(&query, format));

        Ok(match outcome {
            Ok(output) => tool_result(output.to_display_string(), false),
            Err(err) => {
                log_query_error(&params.name, &err);
                tool_result(format!("Error: {err}"), true)
            }
        })
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, McpError> {
    serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn tool_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

fn error_response(id: Value, err: &McpError) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": { "code": err.code(), "message": err.to_string() },
    })
}

fn log_query_error(tool: &str, err: &QueryError) {
    match err {
        QueryError::Fetch(_) => warn!(tool, error = %err, "tool failed"),
        _ => debug!(tool, error = %err, "tool rejected request"),
    }
}

pub fn tool_definitions(catalog: &Catalog) -> Value {
    let zones: Vec<&str> = catalog.names().collect();
    json!([
        {
            "name": "get_map_conditions",
            "description": "Get current map conditions for every zone",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "enum": ["json", "text", "summary"],
                        "description": "json (structured data), text (formatted display) or summary (one line)",
                        "default": "text"
                    }
                },
                "required": []
            }
        },
        {
            "name": "get_specific_map_condition",
            "description": "Get condition details for one zone",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "map_name": {
                        "type": "string",
                        "enum": zones,
                        "description": "Zone to query"
                    },
                    "format": {
                        "type": "string",
                        "enum": ["json", "text"],
                        "default": "text"
                    }
                },
                "required": ["map_name"]
            }
        },
        {
            "name": "get_active_conditions_only",
            "description": "Get only zones that currently show a condition",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "include_major_only": {
                        "type": "boolean",
                        "description": "Only return zones with a major condition",
                        "default": false
                    },
                    "format": {
                        "type": "string",
                        "enum": ["json", "text", "summary"],
                        "default": "text"
                    }
                },
                "required": []
            }
        },
        {
            "name": "get_next_conditions",
            "description": "Get upcoming conditions and their start times",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "enum": ["json", "text", "summary"],
                        "default": "text"
                    }
                },
                "required": []
            }
        }
    ])
}
