//! Flexo MMS MCP adapter.
//!
//! Serves the MMS layer 1 API as MCP tools over streamable HTTP. Each tool call becomes exactly
//! one request to `MMS_URL`, with the caller's `Authorization` header relayed as-is.

mod catalog;
mod config;
mod error;
mod registry;
mod server;

use anyhow::Context as _;
use axum::Router;
use axum::routing::get;
use clap::Parser as _;
use config::{AdapterConfig, Cli, LogFormat};
use flexo_mms_http_tools::runtime::ReqwestTransport;
use registry::Registry;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use server::MmsServer;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let config = AdapterConfig::from_cli(&cli).context("load configuration")?;
    serve(config).await
}

fn init_tracing(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("init tracing: {e}"))
}

async fn serve(config: AdapterConfig) -> anyhow::Result<()> {
    let transport = ReqwestTransport::new(config.request_timeout).context("build HTTP client")?;
    let registry = Arc::new(Registry::new(&config, Arc::new(transport)));

    if config.mms_url.is_empty() {
        warn!("MMS_URL is not set; every tool call will fail with a configuration error");
    }

    let handler = MmsServer::new(registry.clone(), config.read_only);
    let mcp = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let app = Router::new().route("/health", get(|| async { "ok" }));
    let app = if config.mcp_path == "/" {
        app.fallback_service(mcp)
    } else {
        app.nest_service(&config.mcp_path, mcp)
    };

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;

    info!(
        bind = %config.bind,
        mcp_path = %config.mcp_path,
        read_only = config.read_only,
        tools = registry.tools().len(),
        "flexo-mms-mcp listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    info!("flexo-mms-mcp stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
