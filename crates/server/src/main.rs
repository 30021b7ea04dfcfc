//! docctx server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use docctx_client::Orchestrator;
use docctx_core::sources::{default_catalog, validate_catalog};
use docctx_core::{AppConfig, CacheDb, ContentCache};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("invalid configuration")?;

    let catalog = default_catalog(&config);
    validate_catalog(&catalog).context("invalid source catalog")?;

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("cannot open cache at {}", config.db_path.display()))?;
    let cache = ContentCache::new(db, config.ttl())?;
    let orchestrator = Orchestrator::from_config(&config, cache)?;

    tracing::info!(
        db_path = %config.db_path.display(),
        ttl_hours = config.ttl_hours,
        sources = catalog.len(),
        "Starting docctx server on stdio transport"
    );

    let handler = handler::DocsContextServer::new(orchestrator, catalog);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
