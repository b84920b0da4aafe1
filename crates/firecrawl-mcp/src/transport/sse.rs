//! HTTP transport: JSON-RPC over `POST /mcp`, optional bearer auth, and
//! an unauthenticated `/health`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::framing;

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub token: Option<String>,
    pub handler: Arc<ProtocolHandler>,
}

/// HTTP transport for remote MCP clients.
pub struct HttpTransport {
    state: Arc<ServerState>,
}

impl HttpTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self::with_token(handler, None)
    }

    /// Require `Authorization: Bearer <token>` on `/mcp` when a token is set.
    pub fn with_token(handler: ProtocolHandler, token: Option<String>) -> Self {
        let token = token.filter(|t| !t.is_empty());
        Self {
            state: Arc::new(ServerState {
                token,
                handler: Arc::new(handler),
            }),
        }
    }

    pub fn router(&self) -> Router {
        let state = self.state.clone();
        Router::new()
            .route("/mcp", post(handle_request))
            .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
            .route("/health", get(handle_health))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!(
            auth = self.state.token.is_some(),
            "HTTP transport listening on {addr}"
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| McpError::Transport(e.to_string()))
    }
}

/// Bearer token check. `/health` is routed outside this layer.
async fn auth_layer(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    if let Some(expected) = &state.token {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            tracing::warn!("Rejected request with missing or wrong bearer token");
            return (
                StatusCode::UNAUTHORIZED,
                AxumJson(framing::error_reply(&McpError::Unauthorized)),
            )
                .into_response();
        }
    }

    next.run(request).await
}

/// One JSON-RPC message per POST. Notifications are acknowledged with 202.
async fn handle_request(State(state): State<Arc<ServerState>>, body: String) -> Response {
    let msg = match framing::parse_message(&body) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Parse error: {e}");
            return (StatusCode::BAD_REQUEST, AxumJson(framing::error_reply(&e))).into_response();
        }
    };

    match state.handler.handle_message(msg).await {
        Some(reply) => AxumJson(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<serde_json::Value> {
    AxumJson(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.handler.registry().operations().len(),
    }))
}
