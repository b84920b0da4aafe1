//! Configuration loading and resolution.
//!
//! Every setting resolves in the same order: explicit CLI value, then
//! environment variable, then built-in default.

use std::time::Duration;

pub const API_KEY_ENV: &str = "FIRECRAWL_API_KEY";
pub const API_URL_ENV: &str = "FIRECRAWL_API_URL";
pub const TRANSPORT_ENV: &str = "TRANSPORT";
pub const PORT_ENV: &str = "PORT";
pub const TOKEN_ENV: &str = "MCP_AUTH_TOKEN";

pub const DEFAULT_PORT: u16 = 3000;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Firecrawl API key missing: pass --api-key or set FIRECRAWL_API_KEY")]
    MissingApiKey,

    #[error("Unknown transport '{0}' (expected 'stdio' or 'http')")]
    UnknownTransport(String),

    #[error("Invalid port '{0}' in PORT")]
    InvalidPort(String),
}

/// Which transport the server runs when no subcommand is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

impl std::str::FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "stdio" => Ok(Transport::Stdio),
            "http" | "sse" => Ok(Transport::Http),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The API key is mandatory; a blank value counts as missing.
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String, ConfigError> {
    non_blank(explicit)
        .or_else(|| env_var(API_KEY_ENV))
        .ok_or(ConfigError::MissingApiKey)
}

/// Base URL override for self-hosted Firecrawl. `None` means the public API.
pub fn resolve_api_url(explicit: Option<&str>) -> Option<String> {
    non_blank(explicit).or_else(|| env_var(API_URL_ENV))
}

pub fn resolve_transport(explicit: Option<&str>) -> Result<Transport, ConfigError> {
    match non_blank(explicit).or_else(|| env_var(TRANSPORT_ENV)) {
        Some(value) => value.parse(),
        None => Ok(Transport::default()),
    }
}

/// Listen address for the HTTP transport. Binds all interfaces.
pub fn resolve_http_addr(explicit: Option<&str>) -> Result<String, ConfigError> {
    if let Some(addr) = non_blank(explicit) {
        return Ok(addr);
    }
    let port = match env_var(PORT_ENV) {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(raw))?,
        None => DEFAULT_PORT,
    };
    Ok(format!("0.0.0.0:{port}"))
}

pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
    non_blank(explicit).or_else(|| env_var(TOKEN_ENV))
}

/// Zero disables the invocation timeout.
pub fn resolve_timeout(secs: Option<u64>) -> Option<Duration> {
    secs.filter(|&s| s > 0).map(Duration::from_secs)
}
