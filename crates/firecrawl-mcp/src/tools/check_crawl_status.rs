//! `firecrawl_check_crawl_status` tool: current snapshot of a crawl job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use firecrawl_client::ScrapeBackend;

use super::schema::{Field, FieldType, Schema};
use super::{
    backend_error, backend_failure, iso8601, parse_params, to_payload, InvocationError,
    InvocationResult, Operation, OperationKind, UNKNOWN_ERROR,
};

pub const NAME: &str = "firecrawl_check_crawl_status";

const FAILED: &str = "Status check failed";

const DESCRIPTION: &str = "
Check the status of a crawl job.

**Returns:** Status and progress of the crawl job, including results if available.
";

pub fn operation() -> Operation {
    Operation {
        kind: OperationKind::CheckCrawlStatus,
        name: NAME,
        description: DESCRIPTION,
        params: Schema::new(vec![
            Field::required("id", FieldType::String).describe("Crawl job ID to check")
        ]),
        success: Schema::new(vec![
            Field::required("status", FieldType::String),
            Field::optional("completed", FieldType::Integer),
            Field::optional("total", FieldType::Integer),
            Field::optional("creditsUsed", FieldType::Integer),
            Field::optional("expiresAt", FieldType::String),
            Field::optional("data", FieldType::array_of(FieldType::Any)),
            Field::optional("next", FieldType::String),
            Field::required("success", FieldType::Boolean),
        ]),
        read_only: true,
        destructive: false,
    }
}

#[derive(Debug, Deserialize)]
struct StatusArgs {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResult {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credits_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
    success: bool,
}

pub async fn execute(params: Map<String, Value>, backend: &dyn ScrapeBackend) -> InvocationResult {
    let StatusArgs { id } = parse_params(NAME, params)?;
    tracing::debug!(job = %id, "check crawl status");

    let response = backend
        .check_crawl_status(&id)
        .await
        .map_err(|e| backend_error(FAILED, e))?;

    if response.success != Some(true) {
        return Err(backend_failure(FAILED, response.error, UNKNOWN_ERROR));
    }

    let Some(status) = response.status else {
        return Err(InvocationError::BackendFailure(
            "No crawl status received from Firecrawl API".to_string(),
        ));
    };

    to_payload(
        NAME,
        &StatusResult {
            status,
            completed: response.completed,
            total: response.total,
            credits_used: response.credits_used,
            expires_at: response.expires_at.map(iso8601),
            data: response.data,
            next: response.next,
            success: true,
        },
    )
}
