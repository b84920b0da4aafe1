//! `firecrawl_map` tool: discover the URLs of a site.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use firecrawl_client::{MapOptions, ScrapeBackend};

use super::schema::{Field, FieldType, Schema};
use super::{
    backend_error, backend_failure, parse_params, to_payload, InvocationError, InvocationResult,
    Operation, OperationKind, UNKNOWN_ERROR,
};

pub const NAME: &str = "firecrawl_map";

const FAILED: &str = "Map failed";

const DESCRIPTION: &str = "
Map a website to discover all indexed URLs on the site.

**Best for:** Discovering URLs on a website before deciding what to scrape; finding specific sections of a website.
**Not recommended for:** When you already know which specific URL you need (use scrape or batch_scrape); when you need the content of the pages (use scrape after mapping).
**Common mistakes:** Using crawl to discover URLs instead of map.
**Prompt Example:** \"List all URLs on example.com.\"
**Returns:** Array of URLs found on the site.
";

pub fn operation() -> Operation {
    Operation {
        kind: OperationKind::Map,
        name: NAME,
        description: DESCRIPTION,
        params: Schema::new(vec![
            Field::required("url", FieldType::String).describe("Starting URL for URL discovery"),
            Field::optional("search", FieldType::String)
                .describe("Optional search term to filter URLs"),
            Field::optional("ignoreSitemap", FieldType::Boolean)
                .describe("Skip sitemap.xml discovery and only use HTML links"),
            Field::optional("includeSubdomains", FieldType::Boolean)
                .describe("Include URLs from subdomains in results"),
            Field::optional("limit", FieldType::Quantity)
                .describe("Maximum number of URLs to return"),
        ]),
        success: Schema::new(vec![Field::required(
            "links",
            FieldType::array_of(FieldType::String),
        )]),
        read_only: true,
        destructive: false,
    }
}

#[derive(Debug, Deserialize)]
struct MapArgs {
    url: String,
    #[serde(flatten)]
    options: MapOptions,
}

pub async fn execute(params: Map<String, Value>, backend: &dyn ScrapeBackend) -> InvocationResult {
    let MapArgs { url, mut options } = parse_params(NAME, params)?;
    // An empty filter means no filter.
    options.search = options.search.filter(|s| !s.is_empty());
    tracing::debug!(%url, "map");

    let response = backend
        .map_url(&url, &options)
        .await
        .map_err(|e| backend_error(FAILED, e))?;

    if response.success == Some(false) || response.error.is_some() {
        return Err(backend_failure(FAILED, response.error, UNKNOWN_ERROR));
    }

    let Some(links) = response.links else {
        return Err(InvocationError::BackendFailure(
            "No links received from Firecrawl API".to_string(),
        ));
    };

    to_payload(NAME, &json!({ "links": links }))
}
