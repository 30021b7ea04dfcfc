//! Core types and shared functionality for docctx.
//!
//! This crate provides:
//! - Durable content cache with SQLite backend and lazy TTL expiry
//! - Unified error types
//! - Configuration structures
//! - Source descriptors and the default documentation catalog

pub mod cache;
pub mod config;
pub mod error;
pub mod sources;

pub use cache::{CacheDb, CacheEntry, CacheStats, ContentCache};
pub use config::AppConfig;
pub use error::Error;
pub use sources::{SourceDescriptor, SourceGroup};
