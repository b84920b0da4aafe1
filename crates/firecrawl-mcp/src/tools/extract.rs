//! `firecrawl_extract` tool: LLM extraction of structured data from pages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use firecrawl_client::{ExtractOptions, ScrapeBackend};

use super::schema::{Field, FieldType, Schema};
use super::{
    backend_error, backend_failure, parse_params, to_payload, InvocationResult, Operation,
    OperationKind, UNKNOWN_ERROR,
};

pub const NAME: &str = "firecrawl_extract";

const FAILED: &str = "Extraction failed";

const DESCRIPTION: &str = "
Extract structured information from web pages using LLM capabilities. Supports both cloud AI and self-hosted LLM extraction.

**Best for:** Extracting specific structured data like prices, names, details from web pages.
**Not recommended for:** When you need the full content of a page (use scrape); when you're not looking for specific structured data.
**Prompt Example:** \"Extract the product name, price, and description from these product pages.\"
**Returns:** Extracted structured data as defined by your schema.
";

pub fn operation() -> Operation {
    Operation {
        kind: OperationKind::Extract,
        name: NAME,
        description: DESCRIPTION,
        params: Schema::new(vec![
            Field::required("urls", FieldType::array_of(FieldType::String))
                .describe("List of URLs to extract information from"),
            Field::optional("prompt", FieldType::String)
                .describe("Prompt for the LLM extraction"),
            Field::optional("systemPrompt", FieldType::String)
                .describe("System prompt for LLM extraction"),
            Field::optional("schema", FieldType::Any)
                .describe("JSON schema for structured data extraction"),
            Field::optional("allowExternalLinks", FieldType::Boolean)
                .describe("Allow extraction from external links"),
            Field::optional("enableWebSearch", FieldType::Boolean)
                .describe("Enable web search for additional context"),
        ]),
        success: Schema::new(vec![
            Field::required("success", FieldType::Boolean),
            Field::required("data", FieldType::Any),
            Field::optional("warning", FieldType::String),
        ]),
        read_only: true,
        destructive: false,
    }
}

#[derive(Debug, Deserialize)]
struct ExtractArgs {
    urls: Vec<String>,
    #[serde(flatten)]
    options: ExtractOptions,
}

#[derive(Debug, Serialize)]
struct ExtractResult {
    success: bool,
    data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

pub async fn execute(params: Map<String, Value>, backend: &dyn ScrapeBackend) -> InvocationResult {
    let ExtractArgs { urls, mut options } = parse_params(NAME, params)?;
    options.prompt = options.prompt.filter(|s| !s.is_empty());
    options.system_prompt = options.system_prompt.filter(|s| !s.is_empty());
    tracing::debug!(urls = urls.len(), has_schema = options.schema.is_some(), "extract");

    let response = backend
        .extract(&urls, &options)
        .await
        .map_err(|e| backend_error(FAILED, e))?;

    let job_failed = matches!(response.status.as_deref(), Some("failed" | "cancelled"));
    if response.success != Some(true) || job_failed {
        return Err(backend_failure(FAILED, response.error, UNKNOWN_ERROR));
    }

    to_payload(
        NAME,
        &ExtractResult {
            success: true,
            data: response.data.unwrap_or(Value::Null),
            warning: response.warning.filter(|w| !w.is_empty()),
        },
    )
}
