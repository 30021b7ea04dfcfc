//! docs_context tool implementation.
//!
//! Runs the orchestrator over the configured catalog and returns the rendered
//! context together with per-run counts and cache usage.

use docctx_client::{ContextSection, Orchestrator, RunSummary, SourceFailure};
use docctx_core::{Error, SourceDescriptor};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::cache::CacheStatsOutput;

/// Output structure for docs_context tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocsContextOutput {
    /// Rendered context, primary sources first.
    pub context: String,
    pub summary: RunSummary,
    /// Sections included in `context`, in order.
    pub sections: Vec<ContextSection>,
    /// Sources left out because they could not be retrieved.
    pub failures: Vec<SourceFailure>,
    /// Cache usage after the run.
    pub cache: CacheStatsOutput,
}

/// Implementation of the docs_context tool.
pub async fn context_impl(
    orchestrator: &Orchestrator, catalog: &[SourceDescriptor],
) -> Result<CallToolResult, McpError> {
    let context = orchestrator.run_all(catalog).await?;
    let cache = CacheStatsOutput::from(orchestrator.cache().stats().await?);

    let output = DocsContextOutput {
        context: context.render(),
        summary: context.summary,
        sections: context.sections,
        failures: context.failures,
        cache,
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{make_orchestrator, parse_output};

    fn catalog() -> Vec<SourceDescriptor> {
        vec![
            SourceDescriptor::primary("Dart SDK archive", "https://dart.dev/get-dart/archive", 3000),
            SourceDescriptor::supplementary("https://pub.dev/down", "https://pub.dev/down", 2000),
            SourceDescriptor::supplementary("https://dart.dev/language", "https://dart.dev/language", 2000),
        ]
    }

    #[tokio::test]
    async fn test_context_impl() {
        let orchestrator = make_orchestrator().await;

        let result = context_impl(&orchestrator, &catalog()).await.unwrap();
        let output: DocsContextOutput = parse_output(&result);

        assert_eq!(output.summary.total, 3);
        assert_eq!(output.summary.failed, 1);
        assert_eq!(output.sections.len(), 2);
        assert_eq!(output.failures[0].url, "https://pub.dev/down");
        assert!(output.context.contains("## Dart SDK archive"));
        assert!(output.context.contains("page at https://dart.dev/language"));
        assert!(!output.context.contains("menu"));
        assert_eq!(output.cache.item_count, 2);
    }

    #[tokio::test]
    async fn test_context_impl_empty_catalog() {
        let orchestrator = make_orchestrator().await;
        let result = context_impl(&orchestrator, &[]).await;
        assert!(result.is_err());
    }
}
