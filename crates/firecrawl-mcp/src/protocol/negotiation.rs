//! Handshake state: protocol version agreement and the `initialized` flag.

use crate::types::{Implementation, InitializeParams, InitializeResult, MCP_VERSION};

/// Protocol revisions this server can speak, newest first.
pub const SUPPORTED_VERSIONS: &[&str] = &[MCP_VERSION, "2024-11-05"];

#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub client_info: Option<Implementation>,
    pub protocol_version: Option<String>,
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Answer `initialize`. A supported client version is echoed back;
    /// anything else gets the server's own version.
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        let version = if SUPPORTED_VERSIONS.contains(&params.protocol_version.as_str()) {
            params.protocol_version.clone()
        } else {
            tracing::warn!(
                requested = %params.protocol_version,
                offered = MCP_VERSION,
                "unsupported protocol version, offering server version"
            );
            MCP_VERSION.to_string()
        };

        tracing::info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol = %version,
            "initialize"
        );

        self.client_info = Some(params.client_info);
        self.protocol_version = Some(version.clone());

        let mut result = InitializeResult::default_result();
        result.protocol_version = version;
        result
    }

    pub fn mark_initialized(&mut self) {
        if self.protocol_version.is_none() {
            tracing::warn!("initialized notification before initialize");
        }
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }
}
