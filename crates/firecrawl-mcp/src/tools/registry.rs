//! Tool registration and dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use firecrawl_client::{FirecrawlClient, FirecrawlResult, ScrapeBackend};

use crate::types::ToolDefinition;

use super::dispatch::{dispatch, InvocationError, InvocationResult};
use super::{Operation, OperationKind};

/// The gateway: a fixed catalog bound to one backend handle.
///
/// Built once and shared behind `Arc`; invocations take `&self` and keep no
/// state, so any number may run concurrently.
pub struct ToolRegistry {
    operations: Vec<Operation>,
    index: HashMap<&'static str, usize>,
    backend: Arc<dyn ScrapeBackend>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.index.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    /// Connect to the Firecrawl API with `api_key`, at `api_url` if given.
    pub fn new(api_key: &str, api_url: Option<&str>) -> FirecrawlResult<Self> {
        let client = FirecrawlClient::new(api_key, api_url)?;
        tracing::debug!(base_url = client.base_url(), "Firecrawl client ready");
        Ok(Self::with_backend(Arc::new(client)))
    }

    pub fn with_backend(backend: Arc<dyn ScrapeBackend>) -> Self {
        let operations = Self::catalog();
        let index: HashMap<&'static str, usize> = operations
            .iter()
            .enumerate()
            .map(|(i, op)| (op.name, i))
            .collect();
        debug_assert_eq!(index.len(), operations.len(), "duplicate tool name");

        Self {
            operations,
            index,
            backend,
            timeout: None,
        }
    }

    /// Bound every backend call. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The operation catalog, in listing order. Needs no backend.
    pub fn catalog() -> Vec<Operation> {
        OperationKind::ALL.iter().map(|kind| kind.operation()).collect()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.operations.iter().map(Operation::definition).collect()
    }

    /// Invoke the named tool with raw caller arguments.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> InvocationResult {
        let Some(op) = self.get(name) else {
            tracing::debug!(tool = name, "unknown tool");
            return Err(InvocationError::UnknownOperation(name.to_string()));
        };
        dispatch(op, arguments, self.backend.as_ref(), self.timeout).await
    }
}
