//! HTTP-level tests for FirecrawlClient against a mock Firecrawl server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firecrawl_client::{
    CrawlOptions, ExtractOptions, FirecrawlClient, FirecrawlError, MapOptions, ScrapeBackend,
    ScrapeFormat, ScrapeOptions, SearchOptions,
};

// ─────────────────────── helpers ───────────────────────

fn client_for(server: &MockServer) -> FirecrawlClient {
    FirecrawlClient::new("fc-test", Some(&server.uri()))
        .unwrap()
        .with_poll_interval(Duration::from_millis(10))
}

// ═══════════════════════════════════════════════════════
// REQUEST SHAPE
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_scrape_sends_url_and_only_present_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer fc-test"))
        .and(body_json(json!({
            "url": "https://example.com",
            "formats": ["markdown"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": "# Test Content",
                "metadata": { "title": "Example", "sourceURL": "https://example.com" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = ScrapeOptions {
        formats: Some(vec![ScrapeFormat::Markdown]),
        ..Default::default()
    };
    let response = client_for(&server)
        .scrape_url("https://example.com", &options)
        .await
        .unwrap();

    assert_eq!(response.success, Some(true));
    assert_eq!(response.document.markdown.as_deref(), Some("# Test Content"));
    // url is lifted from metadata.sourceURL when the document has none
    assert_eq!(response.document.url.as_deref(), Some("https://example.com"));
}

#[tokio::test]
async fn test_map_and_crawl_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .and(body_json(json!({ "url": "https://example.com", "limit": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "links": ["https://example.com/a", "https://example.com/b"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_json(json!({ "url": "https://example.com/blog", "maxDepth": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "job-123",
            "url": "https://api.firecrawl.dev/v1/crawl/job-123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let map = client
        .map_url(
            "https://example.com",
            &MapOptions {
                limit: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(map.links.unwrap().len(), 2);

    let crawl = client
        .async_crawl_url(
            "https://example.com/blog",
            &CrawlOptions {
                max_depth: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(crawl.id.as_deref(), Some("job-123"));
}

#[tokio::test]
async fn test_search_body_uses_camel_case() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_json(json!({
            "query": "rust mcp",
            "lang": "de",
            "scrapeOptions": { "onlyMainContent": true }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "url": "https://example.com", "title": "Example" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options: SearchOptions = serde_json::from_value(json!({
        "lang": "de",
        "scrapeOptions": { "onlyMainContent": true }
    }))
    .unwrap();
    let response = client_for(&server).search("rust mcp", &options).await.unwrap();
    let data = response.data.unwrap();
    assert_eq!(data[0].title.as_deref(), Some("Example"));
}

#[tokio::test]
async fn test_list_valued_metadata_still_decodes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": "# Hi",
                "metadata": {
                    "title": "T",
                    "description": ["a", "b"],
                    "sourceURL": "https://example.com"
                }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "url": "https://a.example", "metadata": { "description": ["a", "b"] } },
                { "url": "https://b.example", "title": "B" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let scraped = client
        .scrape_url("https://example.com", &ScrapeOptions::default())
        .await
        .unwrap();
    let doc = scraped.document;
    assert_eq!(doc.markdown.as_deref(), Some("# Hi"));
    assert_eq!(doc.url.as_deref(), Some("https://example.com"));
    let meta = doc.metadata.unwrap();
    assert_eq!(meta.title(), Some("T"));
    assert!(meta.description().is_none());

    let hits = client
        .search("q", &SearchOptions::default())
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[1].title.as_deref(), Some("B"));
}

// ═══════════════════════════════════════════════════════
// JOB ENDPOINTS
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_crawl_status_defaults_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "completed": 2,
            "total": 2,
            "creditsUsed": 2,
            "expiresAt": "2024-09-01T12:00:00.000Z",
            "data": [{ "markdown": "# A" }, { "markdown": "# B" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client_for(&server)
        .check_crawl_status("job-123")
        .await
        .unwrap();
    assert_eq!(status.success, Some(true));
    assert_eq!(status.status.as_deref(), Some("completed"));
    assert_eq!(status.data.unwrap().len(), 2);
}

#[tokio::test]
async fn test_extract_polls_until_completed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .and(body_json(json!({
            "urls": ["https://example.com/product"],
            "prompt": "Extract the price",
            "schema": { "type": "object", "properties": { "price": { "type": "number" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "ext-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/ext-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "processing"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/ext-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "completed",
            "data": { "price": 19.99 }
        })))
        .mount(&server)
        .await;

    let options = ExtractOptions {
        prompt: Some("Extract the price".to_string()),
        schema: Some(json!({
            "type": "object",
            "properties": { "price": { "type": "number" } }
        })),
        ..Default::default()
    };
    let response = client_for(&server)
        .extract(&["https://example.com/product".to_string()], &options)
        .await
        .unwrap();

    assert_eq!(response.status.as_deref(), Some("completed"));
    assert_eq!(response.data.unwrap()["price"], 19.99);
}

#[tokio::test]
async fn test_extract_rejected_start_is_returned_as_is() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Invalid schema"
        })))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .extract(&["https://example.com".to_string()], &ExtractOptions::default())
        .await
        .unwrap();
    assert_eq!(response.success, Some(false));
    assert_eq!(response.error.as_deref(), Some("Invalid schema"));
}

// ═══════════════════════════════════════════════════════
// ERROR CLASSIFICATION
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_error_body_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "success": false,
            "error": "Insufficient credits"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .map_url("https://example.com", &MapOptions::default())
        .await
        .unwrap_err();
    match err {
        FirecrawlError::Api { status, message } => {
            assert_eq!(status, 402);
            assert_eq!(message, "Insufficient credits");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_error_body_becomes_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/missing"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .check_crawl_status("missing")
        .await
        .unwrap_err();
    assert!(matches!(err, FirecrawlError::Status { status: 502, .. }));
}

#[tokio::test]
async fn test_non_json_success_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .scrape_url("https://example.com", &ScrapeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FirecrawlError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    let client = FirecrawlClient::new("fc-test", Some("http://127.0.0.1:1")).unwrap();
    let err = client
        .map_url("https://example.com", &MapOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FirecrawlError::Request(_)));
}
