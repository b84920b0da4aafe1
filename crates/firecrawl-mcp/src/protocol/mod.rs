//! MCP protocol handling: JSON-RPC routing onto the tool registry.

pub mod handler;
pub mod negotiation;
pub mod validator;

pub use handler::ProtocolHandler;
