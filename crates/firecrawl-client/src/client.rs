//! Async HTTP client for the Firecrawl v1 REST API, wrapping reqwest.
//!
//! One client per process: the underlying connection pool is shared by every
//! call. No retries happen here; a failed request is reported once.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::ScrapeBackend;
use crate::types::{
    CrawlOptions, CrawlResponse, CrawlStatusResponse, Document, ExtractOptions, ExtractResponse,
    FirecrawlError, FirecrawlResult, MapOptions, MapResponse, ScrapeOptions, ScrapeResponse,
    SearchOptions, SearchResponse,
};

/// Hosted Firecrawl endpoint.
pub const DEFAULT_API_URL: &str = "https://api.firecrawl.dev";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct UrlRequest<'a, O: Serialize> {
    url: &'a str,
    #[serde(flatten)]
    options: &'a O,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(flatten)]
    options: &'a SearchOptions,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    urls: &'a [String],
    #[serde(flatten)]
    options: &'a ExtractOptions,
}

/// `{success, data, warning, error}` wrapper used by scrape.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    warning: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Authenticated Firecrawl API client.
#[derive(Clone)]
pub struct FirecrawlClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    poll_interval: Duration,
}

impl std::fmt::Debug for FirecrawlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirecrawlClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl FirecrawlClient {
    /// Create a client for the hosted API or a self-hosted `api_url`.
    pub fn new(api_key: impl Into<String>, api_url: Option<&str>) -> FirecrawlResult<Self> {
        let raw = api_url.unwrap_or(DEFAULT_API_URL);
        let mut base_url =
            Url::parse(raw).map_err(|e| FirecrawlError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FirecrawlError::InvalidUrl(raw.to_string()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("firecrawl-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirecrawlError::from)?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Override how often extract jobs are polled.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> FirecrawlResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FirecrawlError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Endpoint for a job resource; the id is percent-encoded as one segment.
    fn job_endpoint(&self, path: &str, id: &str) -> FirecrawlResult<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|_| FirecrawlError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> FirecrawlResult<T> {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> FirecrawlResult<T> {
        tracing::debug!("GET {url}");
        let response = self.http.get(url).bearer_auth(&self.api_key).send().await?;
        read_json(response).await
    }
}

/// Decode a 2xx body, or classify a non-2xx one.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> FirecrawlResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        if let Ok(ErrorBody {
            error: Some(message),
        }) = serde_json::from_str::<ErrorBody>(&body)
        {
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let mut body = body;
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(FirecrawlError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| FirecrawlError::Decode(e.to_string()))
}

fn in_progress(job: &ExtractResponse) -> bool {
    job.success != Some(false)
        && matches!(job.status.as_deref(), Some("processing") | Some("pending"))
}

#[async_trait]
impl ScrapeBackend for FirecrawlClient {
    async fn scrape_url(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> FirecrawlResult<ScrapeResponse> {
        let envelope: Envelope<Document> =
            self.post("v1/scrape", &UrlRequest { url, options }).await?;

        let mut document = envelope.data.unwrap_or_default();
        if document.url.is_none() {
            document.url = document
                .metadata
                .as_ref()
                .and_then(|m| m.source_url())
                .map(str::to_string);
        }
        if document.warning.is_none() {
            document.warning = envelope.warning;
        }

        Ok(ScrapeResponse {
            success: envelope.success,
            error: envelope.error,
            document,
        })
    }

    async fn map_url(&self, url: &str, options: &MapOptions) -> FirecrawlResult<MapResponse> {
        self.post("v1/map", &UrlRequest { url, options }).await
    }

    async fn async_crawl_url(
        &self,
        url: &str,
        options: &CrawlOptions,
    ) -> FirecrawlResult<CrawlResponse> {
        self.post("v1/crawl", &UrlRequest { url, options }).await
    }

    async fn check_crawl_status(&self, id: &str) -> FirecrawlResult<CrawlStatusResponse> {
        let mut status: CrawlStatusResponse = self.get(self.job_endpoint("v1/crawl", id)?).await?;
        // The status endpoint omits `success` on 2xx responses.
        if status.success.is_none() {
            status.success = Some(true);
        }
        Ok(status)
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> FirecrawlResult<SearchResponse> {
        self.post("v1/search", &SearchRequest { query, options })
            .await
    }

    async fn extract(
        &self,
        urls: &[String],
        options: &ExtractOptions,
    ) -> FirecrawlResult<ExtractResponse> {
        let started: ExtractResponse = self
            .post("v1/extract", &ExtractRequest { urls, options })
            .await?;

        let id = match (&started.success, &started.id) {
            (Some(true), Some(id)) if started.data.is_none() => id.clone(),
            _ => return Ok(started),
        };

        tracing::debug!("Extract job {id} started, polling every {:?}", self.poll_interval);
        let url = self.job_endpoint("v1/extract", &id)?;
        loop {
            let job: ExtractResponse = self.get(url.clone()).await?;
            if !in_progress(&job) {
                return Ok(job);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
