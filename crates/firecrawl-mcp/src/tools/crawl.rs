//! `firecrawl_crawl` tool: start an asynchronous crawl job.
//!
//! Only the job reference comes back; page content is fetched later through
//! `firecrawl_check_crawl_status`.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use firecrawl_client::{CrawlOptions, ScrapeBackend};

use super::schema::{Field, FieldType, Schema};
use super::{
    backend_error, backend_failure, parse_params, to_payload, InvocationError, InvocationResult,
    Operation, OperationKind, UNKNOWN_ERROR,
};

pub const NAME: &str = "firecrawl_crawl";

const FAILED: &str = "Crawl failed";

const DESCRIPTION: &str = "
Starts an asynchronous crawl job on a website and extracts content from all pages.

**Best for:** Extracting content from multiple related pages, when you need comprehensive coverage.
**Not recommended for:** Extracting content from a single page (use scrape); when token limits are a concern (use map + batch_scrape); when you need fast results (crawling can be slow).
**Warning:** Crawl responses can be very large and may exceed token limits. Limit the crawl depth and number of pages, or use map + batch_scrape for better control.
**Common mistakes:** Setting limit or maxDepth too high (causes token overflow); using crawl for a single page (use scrape instead).
**Prompt Example:** \"Get all blog posts from the first two levels of example.com/blog.\"
**Returns:** Operation ID for status checking; use firecrawl_check_crawl_status to check progress.
";

pub fn operation() -> Operation {
    Operation {
        kind: OperationKind::Crawl,
        name: NAME,
        description: DESCRIPTION,
        params: Schema::new(vec![
            Field::required("url", FieldType::String).describe("Starting URL for the crawl"),
            Field::optional("excludePaths", FieldType::array_of(FieldType::String))
                .describe("URL paths to exclude from crawling"),
            Field::optional("includePaths", FieldType::array_of(FieldType::String))
                .describe("Only crawl these URL paths"),
            Field::optional("maxDepth", FieldType::Quantity)
                .describe("Maximum link depth to crawl"),
            Field::optional("limit", FieldType::Quantity)
                .describe("Maximum number of pages to crawl"),
            Field::optional("allowExternalLinks", FieldType::Boolean)
                .describe("Allow crawling links to external domains"),
        ]),
        success: Schema::new(vec![
            Field::required("id", FieldType::String),
            Field::required("url", FieldType::String),
            Field::required("success", FieldType::Boolean),
        ]),
        read_only: false,
        destructive: false,
    }
}

#[derive(Debug, Deserialize)]
struct CrawlArgs {
    url: String,
    #[serde(flatten)]
    options: CrawlOptions,
}

pub async fn execute(params: Map<String, Value>, backend: &dyn ScrapeBackend) -> InvocationResult {
    let CrawlArgs { url, options } = parse_params(NAME, params)?;
    tracing::debug!(%url, max_depth = ?options.max_depth, limit = ?options.limit, "crawl");

    let response = backend
        .async_crawl_url(&url, &options)
        .await
        .map_err(|e| backend_error(FAILED, e))?;

    if response.success != Some(true) {
        return Err(backend_failure(FAILED, response.error, UNKNOWN_ERROR));
    }

    let id = match response.id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(InvocationError::BackendFailure(
                "No crawl job id received from Firecrawl API".to_string(),
            ))
        }
    };
    tracing::info!(%url, job = %id, "crawl started");

    // The caller's URL is echoed back, not the one the backend normalized.
    to_payload(NAME, &json!({ "id": id, "url": url, "success": true }))
}
