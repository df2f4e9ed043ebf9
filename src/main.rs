//! Amber - MCP server for ServiceNow IT Asset Management
//!
//! This binary runs as an MCP server using stdio transport, allowing
//! Claude Code or Claude Desktop to explore a ServiceNow asset estate
//! through natural language.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `SERVICENOW_INSTANCE`: Instance URL
//! - `SERVICENOW_USERNAME`: User with asset-read roles
//! - `SERVICENOW_PASSWORD`: Password for basic auth
//!
//! # Usage
//!
//! ```bash
//! # Direct execution
//! ./amber
//!
//! # With environment variables
//! SERVICENOW_INSTANCE=https://dev12345.service-now.com \
//! SERVICENOW_USERNAME=asset.reader SERVICENOW_PASSWORD=xxx ./amber
//! ```

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use amber::{config, server, snow_client};

/// Builds the log filter from `RUST_LOG`, falling back to `LOG_LEVEL`.
fn log_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = std::env::var("LOG_LEVEL").unwrap_or_default();
    let directive = match level.trim().to_uppercase().as_str() {
        "DEBUG" => "amber=debug",
        "WARNING" | "WARN" => "amber=warn",
        "ERROR" => "amber=error",
        _ => "amber=info",
    };
    EnvFilter::new(directive)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Initialize logging to stderr (critical for stdio transport!)
    // stdout is reserved for MCP JSON-RPC messages
    fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting Amber MCP server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from environment
    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::debug!("Configuration loaded, instance: {}", config.instance);

    // Create the ServiceNow client
    let snow_client =
        snow_client::SnowClient::new(&config).context("Failed to create ServiceNow client")?;

    tracing::debug!("ServiceNow client initialized");

    // Test connection to the instance before starting
    tracing::info!("Testing connection to ServiceNow...");
    if let Err(e) = snow_client.test_connection().await {
        tracing::error!(error = %e, "Connection test failed");
        // Continue anyway - the instance might become available later
        // But warn the user clearly
        tracing::warn!(
            "Server will start but may not be able to reach ServiceNow. \
             Check configuration and network connectivity."
        );
    }

    // Create the MCP server
    let server = server::AmberServer::new(snow_client);

    tracing::info!("Server initialized, starting stdio transport");

    // Serve on stdio transport
    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    // Wait for the service to complete (shutdown signal)
    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
