//! MCP tool implementations.
//!
//! This module contains all tools exposed by the docctx server.

pub mod cache;
pub mod docs_context;
