use super::{DistributedLock, LockConfig};
use crate::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use snip_core::CacheError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// A per-key lock for a single process.
///
/// Each key maps to its own tokio mutex, created on first use and removed
/// again once nobody holds or waits for it. Waiters are served in FIFO
/// order. Only callers inside this process are serialized; use
/// [`RedisLock`](super::RedisLock) to cover a fleet.
#[derive(Debug, Clone)]
pub struct LocalLock {
    locks: Arc<LockTable>,
    acquire_timeout: Duration,
}

/// Holds a [`LocalLock`] key. Dropping it releases the key, so an unwinding
/// holder never leaves the key locked.
#[derive(Debug)]
pub struct LocalLockGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl LocalLock {
    pub fn new(config: LockConfig) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            acquire_timeout: config.acquire_timeout,
        }
    }

    /// Number of keys currently held or waited on.
    pub fn active_keys(&self) -> usize {
        self.locks.len()
    }
}

impl Default for LocalLock {
    fn default() -> Self {
        Self::new(LockConfig::default())
    }
}

fn prune(locks: &LockTable, key: &str) {
    // The table's own reference is the only one left when nobody holds or
    // waits for the key. Waiters clone the Arc under the shard lock, so this
    // check cannot race with a new acquirer.
    locks.remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
}

#[async_trait]
impl DistributedLock for LocalLock {
    type Guard = LocalLockGuard;

    async fn acquire(&self, key: &str) -> Result<LocalLockGuard> {
        let mutex = self.locks.entry(key.to_owned()).or_default().clone();

        let acquired = tokio::time::timeout(self.acquire_timeout, mutex.lock_owned()).await;
        match acquired {
            Ok(guard) => {
                trace!(key, "Acquired local lock");
                Ok(LocalLockGuard {
                    key: key.to_owned(),
                    guard: Some(guard),
                    locks: Arc::clone(&self.locks),
                })
            }
            Err(_) => {
                prune(&self.locks, key);
                Err(CacheError::Timeout(format!(
                    "lock '{key}' not acquired within {:?}",
                    self.acquire_timeout
                )))
            }
        }
    }

    async fn release(&self, guard: LocalLockGuard) -> Result<()> {
        trace!(key = %guard.key, "Releasing local lock");
        drop(guard);
        Ok(())
    }
}

impl Drop for LocalLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        prune(&self.locks, &self.key);
    }
}
