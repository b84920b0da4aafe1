//! Firecrawl MCP Server: entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use firecrawl_mcp::config::{self, Transport};
use firecrawl_mcp::protocol::ProtocolHandler;
use firecrawl_mcp::tools::ToolRegistry;
use firecrawl_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "firecrawl-mcp",
    about = "MCP server for Firecrawl: web scraping, crawling, search and extraction as LLM tools",
    version
)]
struct Cli {
    /// Firecrawl API key. Also reads FIRECRAWL_API_KEY.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Firecrawl API base URL, for self-hosted instances. Also reads FIRECRAWL_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Abort a tool call after this many seconds (0 = no limit).
    #[arg(long, global = true, env = "FIRECRAWL_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio.
    Serve,

    /// Start MCP server over HTTP.
    #[cfg(feature = "sse")]
    ServeHttp {
        /// Listen address (host:port). Defaults to 0.0.0.0 on $PORT or 3000.
        #[arg(long)]
        addr: Option<String>,

        /// Bearer token required on /mcp. Also reads MCP_AUTH_TOKEN.
        #[arg(long)]
        token: Option<String>,
    },

    /// Print server capabilities and tool names as JSON.
    Info,

    /// Print full tool definitions as JSON.
    Tools,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   firecrawl-mcp completions bash > ~/.local/share/bash-completion/completions/firecrawl-mcp
    ///   firecrawl-mcp completions zsh > ~/.zfunc/_firecrawl-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

impl Cli {
    fn registry(&self) -> anyhow::Result<ToolRegistry> {
        let api_key = config::resolve_api_key(self.api_key.as_deref())?;
        let api_url = config::resolve_api_url(self.api_url.as_deref());
        let registry = ToolRegistry::new(&api_key, api_url.as_deref())
            .context("failed to create Firecrawl client")?
            .with_timeout(config::resolve_timeout(self.timeout_secs));
        Ok(registry)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.as_ref() {
        None => match config::resolve_transport(None)? {
            Transport::Stdio => serve_stdio(&cli).await?,
            #[cfg(feature = "sse")]
            Transport::Http => serve_http(&cli, None, None).await?,
            #[cfg(not(feature = "sse"))]
            Transport::Http => {
                anyhow::bail!("HTTP transport requested but this build lacks the `sse` feature")
            }
        },

        Some(Commands::Serve) => serve_stdio(&cli).await?,

        #[cfg(feature = "sse")]
        Some(Commands::ServeHttp { addr, token }) => {
            serve_http(&cli, addr.as_deref(), token.as_deref()).await?
        }

        Some(Commands::Info) => {
            let capabilities = firecrawl_mcp::types::InitializeResult::default_result();
            let catalog = ToolRegistry::catalog();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": catalog.iter().map(|op| op.name).collect::<Vec<_>>(),
                "tool_count": catalog.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Some(Commands::Tools) => {
            let tools: Vec<_> = ToolRegistry::catalog()
                .iter()
                .map(|op| op.definition())
                .collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }

        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "firecrawl-mcp", &mut std::io::stdout());
        }

        Some(Commands::Repl) => {
            // Browsing the catalog works without credentials.
            let registry = match cli.registry() {
                Ok(registry) => Some(registry),
                Err(e) => {
                    tracing::debug!("REPL starting without backend: {e:#}");
                    None
                }
            };
            firecrawl_mcp::repl::run(registry).await?;
        }
    }

    Ok(())
}

async fn serve_stdio(cli: &Cli) -> anyhow::Result<()> {
    let registry = Arc::new(cli.registry()?);
    tracing::info!(tools = registry.operations().len(), "Firecrawl MCP server (stdio)");
    let transport = StdioTransport::new(ProtocolHandler::new(registry));
    transport.run().await?;
    Ok(())
}

#[cfg(feature = "sse")]
async fn serve_http(cli: &Cli, addr: Option<&str>, token: Option<&str>) -> anyhow::Result<()> {
    use firecrawl_mcp::transport::HttpTransport;

    let registry = Arc::new(cli.registry()?);
    let addr = config::resolve_http_addr(addr)?;
    let token = config::resolve_token(token);

    tracing::info!(tools = registry.operations().len(), "Firecrawl MCP server (http)");
    if token.is_some() {
        tracing::info!("Auth: bearer token required");
    }

    let transport = HttpTransport::with_token(ProtocolHandler::new(registry), token);
    transport.run(&addr).await?;
    Ok(())
}
