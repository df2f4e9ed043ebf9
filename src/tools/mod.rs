//! MCP tool implementations for Amber.
//!
//! This module contains the input types and helper functions for
//! MCP tools that expose ServiceNow asset-management operations.

mod inputs;

pub use inputs::*;
