//! cache_stats tool implementation.

use docctx_core::{CacheStats, ContentCache, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsOutput {
    /// Number of cached pages.
    pub item_count: u64,
    /// Bytes stored across all cached pages.
    pub total_size_bytes: u64,
    /// Same size in megabytes, two decimals.
    pub total_size_mb: f64,
}

impl From<CacheStats> for CacheStatsOutput {
    fn from(stats: CacheStats) -> Self {
        Self { item_count: stats.item_count, total_size_bytes: stats.total_size_bytes, total_size_mb: stats.total_size_mb() }
    }
}

/// Implementation of the cache_stats tool.
pub async fn stats_impl(cache: &ContentCache) -> Result<CallToolResult, McpError> {
    let output = CacheStatsOutput::from(cache.stats().await?);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{make_orchestrator, parse_output};

    #[tokio::test]
    async fn test_stats_empty() {
        let orchestrator = make_orchestrator().await;

        let result = stats_impl(orchestrator.cache()).await.unwrap();
        let output: CacheStatsOutput = parse_output(&result);

        assert_eq!(output.item_count, 0);
        assert_eq!(output.total_size_bytes, 0);
        assert_eq!(output.total_size_mb, 0.0);
    }

    #[tokio::test]
    async fn test_stats_counts_entries() {
        let orchestrator = make_orchestrator().await;
        orchestrator.cache().set("https://dart.dev/docs", "<p>docs</p>").await.unwrap();

        let result = stats_impl(orchestrator.cache()).await.unwrap();
        let output: CacheStatsOutput = parse_output(&result);

        assert_eq!(output.item_count, 1);
        assert!(output.total_size_bytes > 0);
    }
}
