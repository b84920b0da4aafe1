//! Error types and JSON-RPC error codes for the MCP server.

use serde_json::{json, Value};

use super::jsonrpc::{JsonRpcError, RequestId};
use crate::tools::schema::ValidationError;

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const TOOL_NOT_FOUND: i32 = -32803;

    /// Server: Unauthorized (missing or invalid bearer token).
    pub const UNAUTHORIZED: i32 = -32900;
}

/// Protocol-level failures, each answered as a JSON-RPC error.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Tool arguments rejected by the tool's parameter schema.
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        source: ValidationError,
    },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unauthorized")]
    Unauthorized,
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::InvalidArguments { .. } => INVALID_PARAMS,
            McpError::InternalError(_) | McpError::Transport(_) | McpError::Io(_) => {
                INTERNAL_ERROR
            }
            McpError::RequestCancelled => REQUEST_CANCELLED,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::Unauthorized => UNAUTHORIZED,
        }
    }

    /// Structured detail for `error.data`, when there is any.
    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::InvalidArguments { tool, source } => Some(json!({
                "tool": tool,
                "violations": source.violations(),
            })),
            _ => None,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError::reply(id, self.code(), self.to_string(), self.data())
    }
}

pub type McpResult<T> = Result<T, McpError>;
