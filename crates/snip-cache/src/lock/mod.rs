//! Per-key mutual exclusion used to collapse concurrent cache misses.
//!
//! Only holders of the same key contend; different keys never block each
//! other. Acquisition is bounded by [`LockConfig::acquire_timeout`] and is
//! cancelled by dropping the returned future.
//!
//! Leased locks expire on their own; a holder that may outlive the lease
//! polls [`DistributedLock::keep_alive`] alongside its critical section.

mod local;
mod redis_lock;

pub use local::{LocalLock, LocalLockGuard};
pub use redis_lock::{RedisLock, RedisLockGuard};

use crate::Result;
use async_trait::async_trait;
use snip_core::CacheError;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Timing policy for lock acquisition.
#[derive(Debug, Clone, TypedBuilder)]
pub struct LockConfig {
    /// How long a caller waits for the lock before giving up with a timeout.
    #[builder(default = Duration::from_secs(3))]
    pub acquire_timeout: Duration,
    /// Lease on a remote lock. A holder that dies keeps the key locked for
    /// at most this long. Live holders renew it every third of a lease.
    #[builder(default = Duration::from_secs(5))]
    pub lease: Duration,
    /// Pause between attempts on a contended remote lock.
    #[builder(default = Duration::from_millis(20))]
    pub retry_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A lock keyed by string, possibly shared across processes.
#[async_trait]
pub trait DistributedLock: Send + Sync + 'static {
    /// Proof of ownership handed back to [`DistributedLock::release`].
    type Guard: Send + Sync + 'static;

    /// Waits until `key` is free and takes it.
    ///
    /// Fails with `CacheError::Timeout` once the configured acquire timeout
    /// elapses, or with another `CacheError` if the backend is unreachable.
    async fn acquire(&self, key: &str) -> Result<Self::Guard>;

    /// Gives the lock back.
    async fn release(&self, guard: Self::Guard) -> Result<()>;

    /// Renews the lease behind `guard` for as long as the future is polled.
    ///
    /// Only completes once the lease can no longer be renewed, returning the
    /// reason. Locks without a lease never complete.
    async fn keep_alive(&self, _guard: &Self::Guard) -> CacheError {
        std::future::pending().await
    }
}
