//! Wire types used by the MCP server.

pub mod error;
pub mod jsonrpc;
pub mod mcp;

pub use error::*;
pub use jsonrpc::*;
pub use mcp::*;
