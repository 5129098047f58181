use anyhow::Result;
use clap::Parser;
use sheetwire_mcp::config::{CliArgs, ServerConfig};
use sheetwire_mcp::server::SheetServer;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the MCP transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = Arc::new(ServerConfig::from_args(args)?);

    tracing::info!("starting sheetwire-mcp on stdio");
    SheetServer::new(config).run_stdio().await
}
