//! Main request dispatcher: receives JSON-RPC messages, routes to handlers.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::tools::{InvocationError, ToolRegistry};
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::validator::validate_request;

/// Routes MCP messages onto a shared [`ToolRegistry`].
///
/// Only the handshake state sits behind a lock; tool calls go straight to the
/// registry and may run concurrently.
pub struct ProtocolHandler {
    registry: Arc<ToolRegistry>,
    capabilities: Arc<Mutex<NegotiatedCapabilities>>,
}

impl ProtocolHandler {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            capabilities: Arc::new(Mutex::new(NegotiatedCapabilities::default())),
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Handle one decoded message. Notifications produce no response.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::Error(_) => {
                tracing::warn!("Ignoring response sent by client; server issues no requests");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return to_value(e.to_json_rpc_error(request.id));
        }

        let id = request.id.clone();
        match self.dispatch_request(&request).await {
            Ok(value) => to_value(JsonRpcResponse::ok(id, value)),
            Err(e) => {
                tracing::debug!(method = %request.method, id = %id, code = e.code(), "{e}");
                to_value(e.to_json_rpc_error(id))
            }
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "shutdown" => {
                tracing::info!("Shutdown requested");
                Ok(Value::Object(serde_json::Map::new()))
            }
            "ping" => Ok(Value::Object(serde_json::Map::new())),

            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params.clone()).await,

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.capabilities.lock().await.mark_initialized();
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                let request = notification
                    .params
                    .and_then(|p| serde_json::from_value::<CancelledParams>(p).ok());
                match request {
                    Some(p) => tracing::info!(
                        request = %p.request_id,
                        reason = p.reason.as_deref().unwrap_or(""),
                        "Cancellation received; in-flight calls run to completion"
                    ),
                    None => tracing::info!("Received cancellation notification"),
                }
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = required_params(params, "Initialize")?;
        let result = self.capabilities.lock().await.negotiate(init_params);
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.registry.list_tools(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call: ToolCallParams = required_params(params, "Tool call")?;
        let arguments = call
            .arguments
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let result = match self.registry.invoke(&call.name, &arguments).await {
            Ok(payload) => ToolCallResult::json(&payload),
            Err(InvocationError::Validation(source)) => {
                return Err(McpError::InvalidArguments {
                    tool: call.name,
                    source,
                })
            }
            Err(InvocationError::UnknownOperation(name)) => {
                return Err(McpError::ToolNotFound(name))
            }
            Err(e @ InvocationError::SchemaViolation { .. }) => {
                return Err(McpError::InternalError(e.to_string()))
            }
            // Backend trouble is reported to the model as a failed tool result.
            Err(e @ (InvocationError::BackendTransport(_) | InvocationError::BackendFailure(_))) => {
                ToolCallResult::error(e.to_string())
            }
        };

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}

fn required_params<T: DeserializeOwned>(params: Option<Value>, what: &str) -> McpResult<T> {
    params
        .filter(|p| !p.is_null())
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams(format!("{what} params required")))
}

fn to_value(message: impl Serialize) -> Value {
    serde_json::to_value(message).unwrap_or_default()
}
