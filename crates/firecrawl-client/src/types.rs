//! Request options and response shapes for the Firecrawl v1 API.
//!
//! Every response field is optional: the API omits fields freely and nests
//! equivalent data differently between endpoints, so callers decide which
//! fields they require.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Output formats understood by the scrape and search endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrapeFormat {
    #[serde(rename = "markdown")]
    Markdown,
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "rawHtml")]
    RawHtml,
    #[serde(rename = "screenshot")]
    Screenshot,
    #[serde(rename = "links")]
    Links,
    #[serde(rename = "screenshot@fullPage")]
    ScreenshotFullPage,
    #[serde(rename = "extract")]
    Extract,
}

// ─────────────────────── request options ───────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<ScrapeFormat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_main_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<Vec<String>>,
    /// Milliseconds to wait for dynamic content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
    /// Maximum age in milliseconds of a cached page the backend may serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_sitemap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_subdomains: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_external_links: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_options: Option<SearchScrapeOptions>,
}

/// Scrape settings applied to each search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchScrapeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<ScrapeFormat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_main_content: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Caller-supplied JSON schema, forwarded untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_external_links: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_web_search: Option<bool>,
}

// ─────────────────────── responses ───────────────────────

/// Page metadata attached to scraped documents.
///
/// Kept as the raw object: meta tags repeat on real pages, so any key may hold
/// a list where a string is expected. The accessors read string values only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata(pub Map<String, Value>);

impl DocumentMetadata {
    pub fn title(&self) -> Option<&str> {
        self.string("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.string("description")
    }

    pub fn source_url(&self) -> Option<&str> {
        self.string("sourceURL")
    }

    pub fn status_code(&self) -> Option<u64> {
        self.0.get("statusCode").and_then(Value::as_u64)
    }

    /// The value under `key` when it is a string; any other shape is absent.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Decodes an optional field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A scraped page, as returned by scrape and by search hits.
///
/// Fields decode leniently so one odd field never loses the whole page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Scrape result with the document fields lifted to the top level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeResponse {
    pub success: Option<bool>,
    pub error: Option<String>,
    pub document: Document,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub links: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Acknowledgement of a started crawl job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Backend snapshot of a crawl job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStatusResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub credits_used: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// URL of the next page of results when the data is paginated.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Vec<Document>>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Extract job state. `data` holds the structured result once completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Errors raised while talking to the Firecrawl API.
#[derive(thiserror::Error, Debug)]
pub enum FirecrawlError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    /// Non-2xx response without an error message in the body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Non-2xx response whose JSON body carried an `error` message.
    #[error("Firecrawl API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FirecrawlError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FirecrawlError::Timeout
        } else if e.is_decode() {
            FirecrawlError::Decode(e.to_string())
        } else {
            FirecrawlError::Request(e.to_string())
        }
    }
}

/// Convenience result type.
pub type FirecrawlResult<T> = Result<T, FirecrawlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_options_are_not_serialized() {
        let options = ScrapeOptions {
            formats: Some(vec![ScrapeFormat::Markdown]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({ "formats": ["markdown"] })
        );
        assert_eq!(serde_json::to_value(MapOptions::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_format_wire_names() {
        let formats = vec![ScrapeFormat::RawHtml, ScrapeFormat::ScreenshotFullPage];
        assert_eq!(
            serde_json::to_value(formats).unwrap(),
            json!(["rawHtml", "screenshot@fullPage"])
        );
    }

    #[test]
    fn test_metadata_keeps_unknown_keys() {
        let meta: DocumentMetadata = serde_json::from_value(json!({
            "title": "Example",
            "sourceURL": "https://example.com",
            "statusCode": 200,
            "ogImage": "https://example.com/og.png"
        }))
        .unwrap();
        assert_eq!(meta.source_url(), Some("https://example.com"));
        assert_eq!(meta.status_code(), Some(200));
        assert_eq!(meta.0["ogImage"], "https://example.com/og.png");

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["ogImage"], "https://example.com/og.png");
        assert_eq!(back["sourceURL"], "https://example.com");
    }

    #[test]
    fn test_repeated_meta_tags_do_not_break_document() {
        let doc: Document = serde_json::from_value(json!({
            "markdown": "# Hi",
            "title": ["a", "b"],
            "metadata": { "title": "T", "description": ["a", "b"], "statusCode": "200" }
        }))
        .unwrap();
        assert_eq!(doc.markdown.as_deref(), Some("# Hi"));
        assert!(doc.title.is_none());

        let meta = doc.metadata.unwrap();
        assert_eq!(meta.title(), Some("T"));
        assert!(meta.description().is_none());
        assert!(meta.status_code().is_none());
        assert_eq!(meta.0["description"], json!(["a", "b"]));
    }

    #[test]
    fn test_non_object_metadata_is_absent() {
        let doc: Document =
            serde_json::from_value(json!({ "url": "https://a.example", "metadata": "oops" }))
                .unwrap();
        assert!(doc.metadata.is_none());
        assert_eq!(doc.url.as_deref(), Some("https://a.example"));
    }

    #[test]
    fn test_crawl_status_parses_timestamp() {
        let status: CrawlStatusResponse = serde_json::from_value(json!({
            "status": "scraping",
            "completed": 3,
            "total": 10,
            "creditsUsed": 3,
            "expiresAt": "2024-09-01T12:00:00.000Z",
            "data": []
        }))
        .unwrap();
        assert_eq!(status.completed, Some(3));
        assert_eq!(
            status.expires_at.unwrap().to_rfc3339(),
            "2024-09-01T12:00:00+00:00"
        );
        assert!(status.success.is_none());
    }
}
