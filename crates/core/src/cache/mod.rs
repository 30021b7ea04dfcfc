//! SQLite-backed content cache for fetched documentation pages.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - Address-derived keys using SHA-256 hashing
//! - Automatic schema migrations
//! - WAL mode so readers never see a partially written entry
//! - Lazy TTL expiry: stale entries are removed by the read that finds them

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheEntry, CacheStats, ContentCache};
