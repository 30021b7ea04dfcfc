//! cache_clear and cache_invalidate tool implementations.
//!
//! Removes every cached page, or the page cached for one address.

use docctx_core::{ContentCache, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateParams {
    /// Source address whose cached page should be dropped.
    pub url: String,
}

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    pub cleared: bool,
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Output from the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateOutput {
    pub url: String,
    /// Whether an entry existed before the call.
    pub removed: bool,
}

fn to_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the cache_clear tool.
pub async fn clear_impl(cache: &ContentCache) -> Result<CallToolResult, McpError> {
    let deleted = cache.clear_all().await?;
    tracing::info!(deleted, "cache cleared");
    to_result(&CacheClearOutput { cleared: true, deleted })
}

/// Implementation of the cache_invalidate tool.
pub async fn invalidate_impl(cache: &ContentCache, params: CacheInvalidateParams) -> Result<CallToolResult, McpError> {
    let url = params.url.trim();
    if url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let removed = cache.invalidate(url).await?;
    tracing::info!(%url, removed, "cache entry invalidated");
    to_result(&CacheInvalidateOutput { url: url.to_string(), removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{make_orchestrator, parse_output};

    #[tokio::test]
    async fn test_clear() {
        let orchestrator = make_orchestrator().await;
        let cache = orchestrator.cache();
        cache.set("https://dart.dev/a", "a").await.unwrap();
        cache.set("https://dart.dev/b", "b").await.unwrap();

        let result = clear_impl(cache).await.unwrap();
        let output: CacheClearOutput = parse_output(&result);

        assert!(output.cleared);
        assert_eq!(output.deleted, 2);
        assert_eq!(cache.stats().await.unwrap().item_count, 0);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let orchestrator = make_orchestrator().await;
        let cache = orchestrator.cache();
        cache.set("https://dart.dev/a", "a").await.unwrap();

        let params = CacheInvalidateParams { url: "https://dart.dev/a".into() };
        let output: CacheInvalidateOutput = parse_output(&invalidate_impl(cache, params).await.unwrap());

        assert!(output.removed);
        assert!(cache.get("https://dart.dev/a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_missing_entry() {
        let orchestrator = make_orchestrator().await;

        let params = CacheInvalidateParams { url: "https://dart.dev/none".into() };
        let output: CacheInvalidateOutput = parse_output(&invalidate_impl(orchestrator.cache(), params).await.unwrap());

        assert!(!output.removed);
    }

    #[tokio::test]
    async fn test_invalidate_empty_url() {
        let orchestrator = make_orchestrator().await;

        let params = CacheInvalidateParams { url: "  ".into() };
        let result = invalidate_impl(orchestrator.cache(), params).await;

        assert!(result.is_err());
    }
}
