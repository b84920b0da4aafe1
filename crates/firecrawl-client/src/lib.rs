//! Async client for the Firecrawl scraping API.

pub mod backend;
pub mod client;
pub mod types;

pub use backend::ScrapeBackend;
pub use client::{FirecrawlClient, DEFAULT_API_URL};
pub use types::*;
