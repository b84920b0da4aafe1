//! Structural checks on incoming JSON-RPC requests.

use crate::types::{JsonRpcRequest, McpError, McpResult, JSONRPC_VERSION};

/// Reject requests that are well-formed JSON but not valid JSON-RPC 2.0.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{}\"",
            request.jsonrpc
        )));
    }

    if request.method.trim().is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    // Positional params are never used by MCP.
    if let Some(params) = &request.params {
        if !params.is_object() && !params.is_null() {
            return Err(McpError::InvalidRequest(
                "params must be an object".to_string(),
            ));
        }
    }

    Ok(())
}
