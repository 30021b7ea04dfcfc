//! Per-address async locks.
//!
//! A source's cache lookup, network fetch and cache write run while holding
//! the lock for its cache key, so two tasks asking for the same address
//! never fetch it twice at the same time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct AddressLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl AddressLocks {
    /// Wait for exclusive access to `key`.
    pub(crate) async fn acquire(self: &Arc<Self>, key: &str) -> AddressGuard {
        let lock = {
            let mut map = self.map();
            // A waiter cancelled after the holder released leaves an unused lock behind.
            map.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
            map.entry(key.to_string()).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        AddressGuard { locks: Arc::clone(self), key: key.to_string(), guard: Some(guard) }
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map().len()
    }
}

/// Releases the address on drop and forgets its lock once nobody waits on it.
pub(crate) struct AddressGuard {
    locks: Arc<AddressLocks>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AddressGuard {
    fn drop(&mut self) {
        let mut map = self.locks.map();
        drop(self.guard.take());
        // Only the map's own handle left: no holder and no waiter.
        if map.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(AddressLocks::default());
        let first = locks.acquire("a").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = Arc::new(AddressLocks::default());
        let _a = locks.acquire("a").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await.unwrap();
    }

    #[tokio::test]
    async fn test_released_locks_are_forgotten() {
        let locks = Arc::new(AddressLocks::default());
        {
            let _guard = locks.acquire("a").await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_lock_left_by_cancelled_waiter_is_pruned() {
        let locks = Arc::new(AddressLocks::default());
        let first = locks.acquire("a").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());
        assert_eq!(locks.len(), 1);

        let _b = locks.acquire("b").await;
        assert_eq!(locks.len(), 1);
    }
}
