//! Firecrawl MCP Server: web scraping, crawling, search and extraction
//! exposed as Model Context Protocol tools.
//!
//! [`tools::ToolRegistry`] is the gateway: it validates tool arguments,
//! calls the Firecrawl backend and validates the result before returning it.
//! [`protocol::ProtocolHandler`] maps it onto JSON-RPC, and the
//! [`transport`] module carries that over stdio or HTTP.

pub mod config;
pub mod protocol;
pub mod repl;
pub mod tools;
pub mod transport;
pub mod types;

pub use protocol::ProtocolHandler;
pub use tools::{InvocationError, ToolRegistry};
pub use transport::StdioTransport;
