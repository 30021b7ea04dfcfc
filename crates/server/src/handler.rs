//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheInvalidateParams, clear_impl, invalidate_impl, stats_impl};
use crate::tools::docs_context::context_impl;

use docctx_client::Orchestrator;
use docctx_core::SourceDescriptor;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for docctx.
#[derive(Clone)]
pub struct DocsContextServer {
    tool_router: ToolRouter<Self>,
    orchestrator: Orchestrator,
    catalog: Arc<[SourceDescriptor]>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl DocsContextServer {
    /// Create a new server handler over a validated catalog.
    pub fn new(orchestrator: Orchestrator, catalog: Vec<SourceDescriptor>) -> Self {
        Self { tool_router: Self::tool_router(), orchestrator, catalog: catalog.into() }
    }

    #[tool(
        description = "Fetch the documentation sources (cached for up to the configured TTL), extract their text, and return one labeled context document."
    )]
    async fn docs_context(&self) -> Result<CallToolResult, McpError> {
        context_impl(&self.orchestrator, &self.catalog).await
    }

    #[tool(description = "Report the number of cached pages and their total size.")]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(self.orchestrator.cache()).await
    }

    #[tool(description = "Delete every cached page. The next docs_context call refetches all sources.")]
    async fn cache_clear(&self) -> Result<CallToolResult, McpError> {
        clear_impl(self.orchestrator.cache()).await
    }

    #[tool(description = "Delete the cached page for one source address.")]
    async fn cache_invalidate(&self, params: Parameters<CacheInvalidateParams>) -> Result<CallToolResult, McpError> {
        invalidate_impl(self.orchestrator.cache(), params.0).await
    }
}

impl ServerHandler for DocsContextServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "docctx".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
