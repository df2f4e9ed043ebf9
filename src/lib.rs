//! # Amber
//!
//! Amber is an MCP (Model Context Protocol) server for ServiceNow IT Asset
//! Management.
//!
//! It exposes ServiceNow Table API operations as MCP tools, enabling AI
//! assistants like Claude to explore and analyze an asset estate through
//! natural language.
//!
//! ## Features
//!
//! - **Queries**: Search hardware assets, software licenses, and contracts
//! - **Single-asset views**: Full details and lifecycle stage for one asset
//! - **Analysis**: Cost of ownership, license compliance and utilization,
//!   straight-line depreciation, underutilized assets, expiring warranties
//!   and contracts, asset/CI reconciliation, and a health dashboard
//! - **Error handling**: Automatic retry for transient failures with
//!   exponential backoff and `Retry-After` support
//! - **Security**: The instance password is never logged or exposed in
//!   error messages
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with security-conscious message sanitization
//! - [`snow_client`] - HTTP client for the ServiceNow Table API
//! - [`server`] - MCP server implementation with tool routing
//! - [`models`] - Typed views over Table API records plus pure report math
//! - [`tools`] - Tool input parameter structs
//!
//! ## Usage
//!
//! Amber is primarily used as a binary. To run:
//!
//! ```bash
//! # Set required environment variables
//! export SERVICENOW_INSTANCE=https://dev12345.service-now.com
//! export SERVICENOW_USERNAME=asset.reader
//! export SERVICENOW_PASSWORD=your-password
//!
//! # Run the server
//! ./amber
//! ```
//!
//! ## Configuration
//!
//! Amber requires three environment variables:
//!
//! - `SERVICENOW_INSTANCE`: Instance URL
//! - `SERVICENOW_USERNAME`: User with asset-read roles
//! - `SERVICENOW_PASSWORD`: Password for basic auth
//!
//! Optional:
//! - `SERVICENOW_TIMEOUT`: Request timeout in seconds (default 30)
//! - `SERVICENOW_MAX_RETRIES`: Retry attempts for transient errors (default 3)
//! - `LOG_LEVEL`: Logging level (default INFO)
//! - `RUST_LOG`: Fine-grained filter, overrides `LOG_LEVEL` (e.g. `amber=debug`)
//!
//! ## Security Considerations
//!
//! The instance password is stored only in memory and is:
//! - Never logged at any log level
//! - Sanitized from all error messages
//! - Not included in any tool responses
//!
//! ## Example
//!
//! Using the [`SnowClient`](snow_client::SnowClient) directly:
//!
//! ```ignore
//! use amber::config::Config;
//! use amber::snow_client::{SnowClient, SnowQuery, Table};
//!
//! async fn example() -> Result<(), amber::error::AmberError> {
//!     let config = Config::from_env()?;
//!     let client = SnowClient::new(&config)?;
//!
//!     // List in-use computers
//!     let query = SnowQuery::new()
//!         .eq("install_status", "In use")
//!         .eq("model_category", "Computer");
//!
//!     let rows = client.get_records(Table::Hardware, &query, None, 25).await?;
//!     println!("{} assets", rows.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod snow_client;
pub mod tools;
