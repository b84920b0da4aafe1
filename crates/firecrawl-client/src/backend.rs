//! Backend abstraction over the Firecrawl capability provider.
//!
//! `FirecrawlClient` is the production implementation; anything else that can
//! answer these six calls (a test double, a proxy) can stand in for it.

use async_trait::async_trait;

use crate::types::{
    CrawlOptions, CrawlResponse, CrawlStatusResponse, ExtractOptions, ExtractResponse,
    FirecrawlResult, MapOptions, MapResponse, ScrapeOptions, ScrapeResponse, SearchOptions,
    SearchResponse,
};

/// One remote call per operation. Implementations must be safe to share
/// across concurrent invocations.
#[async_trait]
pub trait ScrapeBackend: Send + Sync {
    /// Scrape a single page.
    async fn scrape_url(&self, url: &str, options: &ScrapeOptions)
        -> FirecrawlResult<ScrapeResponse>;

    /// Discover URLs on a site.
    async fn map_url(&self, url: &str, options: &MapOptions) -> FirecrawlResult<MapResponse>;

    /// Start a crawl job without waiting for it.
    async fn async_crawl_url(
        &self,
        url: &str,
        options: &CrawlOptions,
    ) -> FirecrawlResult<CrawlResponse>;

    /// Current snapshot of a crawl job.
    async fn check_crawl_status(&self, id: &str) -> FirecrawlResult<CrawlStatusResponse>;

    /// Web search, optionally scraping each hit.
    async fn search(&self, query: &str, options: &SearchOptions)
        -> FirecrawlResult<SearchResponse>;

    /// LLM extraction of structured data from one or more pages.
    async fn extract(
        &self,
        urls: &[String],
        options: &ExtractOptions,
    ) -> FirecrawlResult<ExtractResponse>;
}
