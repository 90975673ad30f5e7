//! Cartoon Catalog - REST service entry point

use cartoon_catalog::{api, core, store};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Cartoon Catalog v{}", cartoon_catalog::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        enable_auth = config.security.enable_auth,
        allowed_origins = ?config.security.allowed_origins,
        rate_limit_requests = config.security.rate_limit_requests,
        rate_limit_window = config.security.rate_limit_window,
        "Security configuration"
    );

    let store = store::CartoonStore::load(&config.data)
        .context("Failed to load cartoon dataset")?;
    let store = Arc::new(store);

    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config, store)?;

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
