//! Firecrawl tools: catalog entries, backend adapters, and dispatch.
//!
//! Each tool module exposes `operation()` (its catalog entry) and `execute()`
//! (its adapter onto the backend).

pub mod check_crawl_status;
pub mod crawl;
pub mod dispatch;
pub mod extract;
pub mod map;
pub mod registry;
pub mod schema;
pub mod scrape;
pub mod search;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use firecrawl_client::{FirecrawlError, ScrapeBackend};

use crate::types::{ToolAnnotations, ToolDefinition};

pub use dispatch::{InvocationError, InvocationResult};
pub use registry::ToolRegistry;
use schema::{Schema, ValidationError, Violation};

/// Which adapter serves an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Scrape,
    Map,
    Crawl,
    CheckCrawlStatus,
    Search,
    Extract,
}

impl OperationKind {
    /// Catalog order.
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Scrape,
        OperationKind::Map,
        OperationKind::Crawl,
        OperationKind::CheckCrawlStatus,
        OperationKind::Search,
        OperationKind::Extract,
    ];

    pub fn operation(self) -> Operation {
        match self {
            OperationKind::Scrape => scrape::operation(),
            OperationKind::Map => map::operation(),
            OperationKind::Crawl => crawl::operation(),
            OperationKind::CheckCrawlStatus => check_crawl_status::operation(),
            OperationKind::Search => search::operation(),
            OperationKind::Extract => extract::operation(),
        }
    }

    /// Run the adapter on already-validated parameters.
    pub async fn execute(
        self,
        params: Map<String, Value>,
        backend: &dyn ScrapeBackend,
    ) -> InvocationResult {
        match self {
            OperationKind::Scrape => scrape::execute(params, backend).await,
            OperationKind::Map => map::execute(params, backend).await,
            OperationKind::Crawl => crawl::execute(params, backend).await,
            OperationKind::CheckCrawlStatus => check_crawl_status::execute(params, backend).await,
            OperationKind::Search => search::execute(params, backend).await,
            OperationKind::Extract => extract::execute(params, backend).await,
        }
    }
}

/// Immutable catalog entry for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: &'static str,
    pub description: &'static str,
    pub params: Schema,
    pub success: Schema,
    /// False when the call starts work on the backend.
    pub read_only: bool,
    pub destructive: bool,
}

impl Operation {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: Some(self.description.trim().to_string()),
            input_schema: self.params.to_json_schema(),
            annotations: Some(ToolAnnotations {
                read_only_hint: self.read_only,
                destructive_hint: self.destructive,
            }),
        }
    }
}

// ─────────────────────── adapter helpers ───────────────────────

/// Fallback when the backend reports failure without saying why.
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";

/// Turn validated parameters into the adapter's typed arguments.
pub(crate) fn parse_params<T: DeserializeOwned>(
    tool: &str,
    params: Map<String, Value>,
) -> Result<T, InvocationError> {
    serde_json::from_value(Value::Object(params)).map_err(|e| InvocationError::SchemaViolation {
        operation: tool.to_string(),
        error: ValidationError::new(vec![Violation::new("", e.to_string())]),
    })
}

/// Serialize an adapter result into the payload handed to validation.
pub(crate) fn to_payload(tool: &str, result: &impl Serialize) -> InvocationResult {
    serde_json::to_value(result).map_err(|e| InvocationError::SchemaViolation {
        operation: tool.to_string(),
        error: ValidationError::new(vec![Violation::new("", e.to_string())]),
    })
}

/// Classify an error raised by the backend call itself.
///
/// An API error body counts as an in-band failure; everything else is a
/// transport fault.
pub(crate) fn backend_error(label: &str, e: FirecrawlError) -> InvocationError {
    match e {
        FirecrawlError::Api { message, .. } => {
            InvocationError::BackendFailure(format!("{label}: {message}"))
        }
        other => InvocationError::BackendTransport(format!("{label}: {other}")),
    }
}

/// In-band failure carrying the backend's own error text when present.
pub(crate) fn backend_failure(
    label: &str,
    error: Option<String>,
    fallback: &str,
) -> InvocationError {
    let reason = error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    InvocationError::BackendFailure(format!("{label}: {reason}"))
}

/// Canonical ISO-8601, matching `Date.prototype.toISOString`.
pub(crate) fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso8601_millis_and_z() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(iso8601(ts), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_api_error_is_in_band_failure() {
        let err = backend_error(
            "Map failed",
            FirecrawlError::Api {
                status: 402,
                message: "Insufficient credits".to_string(),
            },
        );
        assert!(matches!(err, InvocationError::BackendFailure(ref m) if m == "Map failed: Insufficient credits"));

        let err = backend_error("Map failed", FirecrawlError::Timeout);
        assert!(matches!(err, InvocationError::BackendTransport(_)));
    }

    #[test]
    fn test_blank_backend_error_uses_fallback() {
        let err = backend_failure("Crawl failed", Some("  ".to_string()), UNKNOWN_ERROR);
        assert_eq!(err.to_string(), "Crawl failed: Unknown error");
    }

    #[test]
    fn test_definition_carries_annotations() {
        let def = OperationKind::Crawl.operation().definition();
        let annotations = def.annotations.unwrap();
        assert!(!annotations.read_only_hint);
        assert!(!annotations.destructive_hint);
        assert!(!def.description.unwrap().starts_with('\n'));
    }
}
