//! Time-bounded content cache keyed by source address.
//!
//! Entries expire lazily: freshness is checked when an entry is read, and a
//! stale entry is deleted by the read that finds it. Nothing runs in the
//! background.

use std::time::Duration;

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{OptionalExtension, TransactionBehavior};

/// A cached raw payload for one source address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// SHA-256 of `url`, hex encoded.
    pub key: String,
    pub url: String,
    pub content: String,
    pub stored_at: DateTime<Utc>,
}

/// Storage usage, computed from the rows present at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    pub item_count: u64,
    pub total_size_bytes: u64,
}

impl CacheStats {
    /// Size in megabytes, rounded to two decimals.
    pub fn total_size_mb(&self) -> f64 {
        (self.total_size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}

/// Durable cache of raw fetched content with a uniform TTL.
#[derive(Debug, Clone)]
pub struct ContentCache {
    db: CacheDb,
    ttl: TimeDelta,
}

impl ContentCache {
    /// Wrap an open database with the given entry lifetime.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `ttl` is zero or too large to
    /// represent as a timestamp offset.
    pub fn new(db: CacheDb, ttl: Duration) -> Result<Self, Error> {
        if ttl.is_zero() {
            return Err(Error::InvalidConfig("cache ttl must be greater than 0".into()));
        }
        let ttl = TimeDelta::from_std(ttl).map_err(|e| Error::InvalidConfig(format!("cache ttl out of range: {e}")))?;
        Ok(Self { db, ttl })
    }

    /// Return the cached content for `url` if present and fresh.
    pub async fn get(&self, url: &str) -> Result<Option<String>, Error> {
        Ok(self.get_entry(url).await?.map(|entry| entry.content))
    }

    /// Return the full cache entry for `url` if present and fresh.
    ///
    /// An expired entry is deleted in the same transaction that read it.
    pub async fn get_entry(&self, url: &str) -> Result<Option<CacheEntry>, Error> {
        self.get_entry_at(url, Utc::now()).await
    }

    async fn get_entry_at(&self, url: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>, Error> {
        let key = compute_cache_key(url);
        let ttl = self.ttl;

        let entry = self
            .db
            .conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                let row = tx
                    .query_row(
                        "SELECT url, content, stored_at FROM entries WHERE key = ?1",
                        params![key],
                        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
                    )
                    .optional()?;

                let Some((url, content, stored_at_raw)) = row else {
                    return Ok(None);
                };

                let stored_at = DateTime::parse_from_rfc3339(&stored_at_raw).map(|ts| ts.with_timezone(&Utc));

                match stored_at {
                    Ok(stored_at) if now.signed_duration_since(stored_at) <= ttl => {
                        Ok(Some(CacheEntry { key, url, content, stored_at }))
                    }
                    _ => {
                        tx.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
                        tx.commit()?;
                        tracing::debug!(%url, stored_at = %stored_at_raw, "evicted expired cache entry");
                        Ok(None)
                    }
                }
            })
            .await?;

        Ok(entry)
    }

    /// Store `content` for `url`, replacing any previous entry.
    ///
    /// The row is written by a single UPSERT, so readers observe either the
    /// previous entry or the new one.
    pub async fn set(&self, url: &str, content: &str) -> Result<(), Error> {
        self.set_at(url, content, Utc::now()).await
    }

    async fn set_at(&self, url: &str, content: &str, stored_at: DateTime<Utc>) -> Result<(), Error> {
        let key = compute_cache_key(url);
        let url = url.to_string();
        let content = content.to_string();
        let stored_at = stored_at.to_rfc3339_opts(SecondsFormat::Millis, true);

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (key, url, content, stored_at) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(key) DO UPDATE SET
                        url = excluded.url,
                        content = excluded.content,
                        stored_at = excluded.stored_at",
                    params![key, url, content, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for `url`.
    ///
    /// Returns whether an entry existed. Removing a missing entry succeeds.
    pub async fn invalidate(&self, url: &str) -> Result<bool, Error> {
        let key = compute_cache_key(url);
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove every entry. Returns the number of deleted entries.
    pub async fn clear_all(&self) -> Result<u64, Error> {
        self.db
            .conn
            .call(|conn| -> Result<u64, Error> {
                let deleted = conn.execute("DELETE FROM entries", [])?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries and their stored size by scanning the table.
    pub async fn stats(&self) -> Result<CacheStats, Error> {
        self.db
            .conn
            .call(|conn| -> Result<CacheStats, Error> {
                let (count, size): (i64, i64) = conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(
                        LENGTH(CAST(url AS BLOB)) +
                        LENGTH(CAST(content AS BLOB)) +
                        LENGTH(CAST(stored_at AS BLOB))
                     ), 0)
                     FROM entries",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok(CacheStats { item_count: count as u64, total_size_bytes: size as u64 })
            })
            .await
            .map_err(Error::from)
    }
}
