//! Cache-related MCP tools.
//!
//! Status reporting and explicit invalidation of the content cache.

pub mod purge;
pub mod stats;

pub use purge::{CacheInvalidateParams, clear_impl, invalidate_impl};
pub use stats::{CacheStatsOutput, stats_impl};
