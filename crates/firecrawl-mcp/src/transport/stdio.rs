//! Stdio transport: reads JSON-RPC from stdin, writes to stdout.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::{JoinError, JoinSet};

use crate::protocol::ProtocolHandler;
use crate::types::{JsonRpcMessage, McpError, McpResult};

use super::framing;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Serve stdin/stdout until EOF.
    pub async fn run(&self) -> McpResult<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        tracing::info!("Stdio transport started");
        self.serve(reader, writer).await
    }

    /// Serve any line-oriented stream pair until the reader reaches EOF.
    ///
    /// Handshake and listing requests are answered inline, in arrival order.
    /// Tool calls run as background tasks and are answered when they finish,
    /// so a slow call never holds up the requests behind it. At EOF the
    /// calls still running are awaited and answered before returning.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut in_flight: JoinSet<Option<Value>> = JoinSet::new();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.map_err(McpError::Io)? else {
                        tracing::info!("EOF on input, shutting down");
                        break;
                    };
                    if let Some(reply) = self.accept(line.trim(), &mut in_flight).await {
                        write_reply(&mut writer, &reply).await?;
                    }
                }
                Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Some(reply) = finished(done) {
                        write_reply(&mut writer, &reply).await?;
                    }
                }
            }
        }

        if !in_flight.is_empty() {
            tracing::debug!(pending = in_flight.len(), "Waiting for running tool calls");
        }
        while let Some(done) = in_flight.join_next().await {
            if let Some(reply) = finished(done) {
                write_reply(&mut writer, &reply).await?;
            }
        }

        Ok(())
    }

    /// Handle one input line. Returns the reply when it is ready now; tool
    /// calls are spawned onto `in_flight` instead.
    async fn accept(&self, line: &str, in_flight: &mut JoinSet<Option<Value>>) -> Option<Value> {
        if line.is_empty() {
            return None;
        }

        let msg = match framing::parse_message(line) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                return Some(framing::error_reply(&e));
            }
        };

        if is_tool_call(&msg) {
            let handler = Arc::clone(&self.handler);
            in_flight.spawn(async move { handler.handle_message(msg).await });
            return None;
        }

        self.handler.handle_message(msg).await
    }
}

fn is_tool_call(msg: &JsonRpcMessage) -> bool {
    msg.is_request() && msg.method() == Some("tools/call")
}

fn finished(done: Result<Option<Value>, JoinError>) -> Option<Value> {
    match done {
        Ok(reply) => reply,
        Err(e) => {
            // The request id went down with the task, so nothing can be sent.
            tracing::error!("Tool call task failed: {e}");
            None
        }
    }
}

async fn write_reply<W>(writer: &mut W, reply: &Value) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    let framed = framing::frame_message(reply)?;
    writer
        .write_all(framed.as_bytes())
        .await
        .map_err(McpError::Io)?;
    writer.flush().await.map_err(McpError::Io)
}
