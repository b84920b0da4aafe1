//! Newline-delimited JSON framing shared by the transports.

use serde_json::Value;

use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse one line of text as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Error reply for input that could not be decoded. The id is unknown, so
/// it is always null.
pub fn error_reply(error: &McpError) -> Value {
    serde_json::to_value(error.to_json_rpc_error(RequestId::Null)).unwrap_or_default()
}
