//! SE Ranking data MCP server
//!
//! Exposes SEO research, project and SERP tools to LLM agents over stdio
//! (single user, token from the environment or config) or streamable HTTP
//! (multi-tenant, token from each request's `Authorization` header).

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use seodata_client::ClientConfig;
use seodata_mcp::server::SeoDataMcpServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportMode {
    Stdio,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "seodata-mcp", version, about = "MCP server for the SE Ranking data API")]
struct Cli {
    /// Path to a TOML config file (defaults to ./.seodata.toml or ~/.config/seodata.toml)
    #[arg(long, env = "SEODATA_CONFIG")]
    config: Option<PathBuf>,

    /// MCP transport to serve
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    transport: TransportMode,

    /// Listen address for the HTTP transport
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: SocketAddr,

    /// Log output format (logs always go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("seodata_mcp=info".parse()?)
        .add_directive("seodata_client=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = ClientConfig::load(cli.config.as_deref())?;
    tracing::info!(base_url = %config.base_url, "Loaded client config");
    let server = SeoDataMcpServer::from_config(config)?;

    match cli.transport {
        TransportMode::Stdio => {
            tracing::info!("seodata-mcp starting (stdio transport)");
            if server.executor().credentials().resolve().is_none() {
                tracing::warn!("No API token configured; tool calls will fail until one is set");
            }
            let service = server.serve(rmcp::transport::io::stdio()).await?;
            service.waiting().await?;
        }
        TransportMode::Http => {
            tracing::info!(bind = %cli.bind, "seodata-mcp starting (streamable HTTP transport at /mcp)");
            let service = StreamableHttpService::new(
                move || Ok(server.clone()),
                LocalSessionManager::default().into(),
                StreamableHttpServerConfig::default(),
            );
            let router = axum::Router::new().nest_service("/mcp", service);
            let listener = tokio::net::TcpListener::bind(cli.bind).await?;
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Shutting down");
                })
                .await?;
        }
    }

    Ok(())
}
