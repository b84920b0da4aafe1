//! Shared fixtures: a scripted, call-recording backend and JSON-RPC helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use firecrawl_client::*;
use firecrawl_mcp::protocol::ProtocolHandler;
use firecrawl_mcp::tools::ToolRegistry;
use firecrawl_mcp::types::JsonRpcMessage;

/// One backend call as the mock saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    /// URL, query, job id or URL list.
    pub target: Value,
    /// Serialized options, exactly as they would go on the wire.
    pub options: Value,
}

pub enum Reply {
    Json(Value),
    Fail(fn() -> FirecrawlError),
    /// Never answers.
    Hang,
}

enum Outcome {
    Json(Value),
    Fail(FirecrawlError),
    Hang,
}

#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<HashMap<&'static str, Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` ("scrape", "map", "crawl", "status", "search",
    /// "extract") with this JSON body.
    pub fn with_reply(self, method: &'static str, body: Value) -> Self {
        self.replies.lock().unwrap().insert(method, Reply::Json(body));
        self
    }

    pub fn with_error(self, method: &'static str, error: fn() -> FirecrawlError) -> Self {
        self.replies.lock().unwrap().insert(method, Reply::Fail(error));
        self
    }

    pub fn hanging(self, method: &'static str) -> Self {
        self.replies.lock().unwrap().insert(method, Reply::Hang);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn respond<T: DeserializeOwned>(
        &self,
        method: &'static str,
        target: Value,
        options: &impl Serialize,
    ) -> FirecrawlResult<T> {
        self.calls.lock().unwrap().push(Call {
            method,
            target,
            options: serde_json::to_value(options).unwrap(),
        });

        let outcome = match self.replies.lock().unwrap().get(method) {
            Some(Reply::Json(body)) => Outcome::Json(body.clone()),
            Some(Reply::Fail(make)) => Outcome::Fail(make()),
            Some(Reply::Hang) => Outcome::Hang,
            None => Outcome::Fail(FirecrawlError::Request(format!("no reply for {method}"))),
        };

        match outcome {
            Outcome::Json(body) => {
                serde_json::from_value(body).map_err(|e| FirecrawlError::Decode(e.to_string()))
            }
            Outcome::Fail(e) => Err(e),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FirecrawlError::Timeout)
            }
        }
    }
}

#[async_trait]
impl ScrapeBackend for MockBackend {
    async fn scrape_url(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> FirecrawlResult<ScrapeResponse> {
        let body: Value = self.respond("scrape", json!(url), options).await?;
        let success = body.get("success").and_then(Value::as_bool);
        let error = body.get("error").and_then(Value::as_str).map(str::to_string);
        let document =
            serde_json::from_value(body).map_err(|e| FirecrawlError::Decode(e.to_string()))?;
        Ok(ScrapeResponse {
            success,
            error,
            document,
        })
    }

    async fn map_url(&self, url: &str, options: &MapOptions) -> FirecrawlResult<MapResponse> {
        self.respond("map", json!(url), options).await
    }

    async fn async_crawl_url(
        &self,
        url: &str,
        options: &CrawlOptions,
    ) -> FirecrawlResult<CrawlResponse> {
        self.respond("crawl", json!(url), options).await
    }

    async fn check_crawl_status(&self, id: &str) -> FirecrawlResult<CrawlStatusResponse> {
        self.respond("status", json!(id), &json!({})).await
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> FirecrawlResult<SearchResponse> {
        self.respond("search", json!(query), options).await
    }

    async fn extract(
        &self,
        urls: &[String],
        options: &ExtractOptions,
    ) -> FirecrawlResult<ExtractResponse> {
        self.respond("extract", json!(urls), options).await
    }
}

/// Registry over a shared mock, so the test can inspect calls afterwards.
pub fn registry(mock: &Arc<MockBackend>) -> ToolRegistry {
    ToolRegistry::with_backend(mock.clone())
}

pub fn handler(mock: &Arc<MockBackend>) -> ProtocolHandler {
    ProtocolHandler::new(Arc::new(registry(mock)))
}

/// Build an MCP JSON-RPC request.
pub fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

pub fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

/// Send a JSON-RPC message through the handler and return the response.
pub async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

pub async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// The JSON payload inside a successful `tools/call` result.
pub fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content");
    serde_json::from_str(text).expect("payload is JSON")
}
