//! Invocation dispatch: validate input, call the adapter, validate output.
//!
//! Each invocation moves through
//! `Received → Validated → AdapterSucceeded → Done`, and may stop early at
//! `Invalid`, `AdapterFailed` or `SchemaViolation`. Nothing is kept between
//! invocations, so concurrent calls never wait on each other.

use std::time::{Duration, Instant};

use serde_json::Value;

use firecrawl_client::ScrapeBackend;

use super::schema::ValidationError;
use super::Operation;

/// Why an invocation produced no payload.
#[derive(thiserror::Error, Debug)]
pub enum InvocationError {
    /// Caller input does not satisfy the parameter schema.
    #[error("{0}")]
    Validation(ValidationError),

    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    /// Network, timeout or HTTP-level fault talking to the backend.
    #[error("{0}")]
    BackendTransport(String),

    /// The backend answered but reported failure.
    #[error("{0}")]
    BackendFailure(String),

    /// The adapter produced a result its own schema rejects.
    #[error("{operation} produced a malformed result: {error}")]
    SchemaViolation {
        operation: String,
        error: ValidationError,
    },
}

pub type InvocationResult = Result<Value, InvocationError>;

/// Run one invocation of `op` against `backend`.
pub async fn dispatch(
    op: &Operation,
    arguments: &Value,
    backend: &dyn ScrapeBackend,
    timeout: Option<Duration>,
) -> InvocationResult {
    let started = Instant::now();

    let params = op.params.validate(arguments).map_err(|e| {
        tracing::debug!(tool = op.name, state = "Invalid", "{e}");
        InvocationError::Validation(e)
    })?;
    tracing::debug!(tool = op.name, state = "Validated");

    let call = op.kind.execute(params, backend);
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
            Err(InvocationError::BackendTransport(format!(
                "{} timed out after {}s",
                op.name,
                limit.as_secs_f64()
            )))
        }),
        None => call.await,
    };

    let payload = outcome.map_err(|e| {
        tracing::warn!(
            tool = op.name,
            state = "AdapterFailed",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "{e}"
        );
        e
    })?;

    let result = op.success.validate(&payload).map_err(|error| {
        tracing::error!(tool = op.name, state = "SchemaViolation", "{error}");
        InvocationError::SchemaViolation {
            operation: op.name.to_string(),
            error,
        }
    })?;

    tracing::debug!(
        tool = op.name,
        state = "Done",
        elapsed_ms = started.elapsed().as_millis() as u64
    );
    Ok(Value::Object(result))
}
