use super::{DistributedLock, LockConfig};
use crate::redis::map_redis_error;
use crate::Result;
use async_trait::async_trait;
use snip_core::CacheError;
use std::time::Duration;
use tracing::{debug, trace, warn};
use uuid::Uuid;

// Delete the key only if it still carries our token, so a holder whose
// lease already ran out cannot release the next holder's lock.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

// Same ownership check, pushing the expiry out instead of deleting.
const RENEW_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("PEXPIRE", KEYS[1], ARGV[2])
else
    return 0
end
"#;

/// A lease-based lock shared by every node through Redis.
///
/// Acquisition is `SET key token NX PX lease`, retried every
/// `retry_interval` until `acquire_timeout`. The lease bounds how long a
/// crashed holder can keep a key locked; it is also what frees the key if
/// the holder unwinds without calling [`DistributedLock::release`].
/// Holders that run longer than the lease extend it through
/// [`DistributedLock::keep_alive`].
#[derive(Debug, Clone)]
pub struct RedisLock {
    conn: redis::aio::MultiplexedConnection,
    config: LockConfig,
    release_script: redis::Script,
    renew_script: redis::Script,
}

/// Ownership token for a [`RedisLock`] key.
#[derive(Debug)]
pub struct RedisLockGuard {
    key: String,
    token: String,
}

impl RedisLock {
    pub fn new(conn: redis::aio::MultiplexedConnection, config: LockConfig) -> Self {
        Self {
            conn,
            config,
            release_script: redis::Script::new(RELEASE_SCRIPT),
            renew_script: redis::Script::new(RENEW_SCRIPT),
        }
    }

    fn lease_ms(&self) -> u64 {
        u64::try_from(self.config.lease.as_millis()).unwrap_or(u64::MAX)
    }

    async fn try_acquire(&self, key: &str, token: &str) -> Result<bool> {
        let lease_ms = self.lease_ms();
        let mut conn = self.conn.clone();
        let reply: redis::Value = redis::cmd("SET")
            .arg(key)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(lease_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to acquire lock", e))?;
        Ok(!matches!(reply, redis::Value::Nil))
    }

    async fn acquire_with_retry(&self, key: &str, token: &str) -> Result<()> {
        loop {
            if self.try_acquire(key, token).await? {
                return Ok(());
            }
            trace!(key, "Lock busy, retrying");
            tokio::time::sleep(self.config.retry_interval).await;
        }
    }

    /// Deletes `key` if it still holds `token`. Returns whether it did.
    async fn delete_if_owner(&self, key: &str, token: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let deleted: i64 = self
            .release_script
            .key(key)
            .arg(token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to release lock", e))?;
        Ok(deleted != 0)
    }

    async fn renew(&self, guard: &RedisLockGuard) -> Result<bool> {
        let mut conn = self.conn.clone();
        let renewed: i64 = self
            .renew_script
            .key(&guard.key)
            .arg(&guard.token)
            .arg(self.lease_ms())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to renew lock", e))?;
        Ok(renewed != 0)
    }

    fn timeout_error(key: &str, timeout: Duration) -> CacheError {
        CacheError::Timeout(format!("lock '{key}' not acquired within {timeout:?}"))
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    type Guard = RedisLockGuard;

    async fn acquire(&self, key: &str) -> Result<RedisLockGuard> {
        let token = Uuid::new_v4().to_string();
        let timeout = self.config.acquire_timeout;

        let attempt = tokio::time::timeout(timeout, self.acquire_with_retry(key, &token)).await;
        match attempt {
            Ok(acquired) => acquired?,
            Err(_) => {
                // a SET cut off by the timeout may still have landed
                if let Err(e) = self.delete_if_owner(key, &token).await {
                    warn!(key, error = %e, "Failed to clear abandoned lock attempt");
                }
                return Err(Self::timeout_error(key, timeout));
            }
        }

        debug!(key, "Acquired Redis lock");
        Ok(RedisLockGuard {
            key: key.to_owned(),
            token,
        })
    }

    async fn release(&self, guard: RedisLockGuard) -> Result<()> {
        if self.delete_if_owner(&guard.key, &guard.token).await? {
            trace!(key = %guard.key, "Released Redis lock");
        } else {
            warn!(key = %guard.key, "Lock lease expired before release");
        }
        Ok(())
    }

    async fn keep_alive(&self, guard: &RedisLockGuard) -> CacheError {
        let period = self.config.lease / 3;
        loop {
            tokio::time::sleep(period).await;
            match self.renew(guard).await {
                Ok(true) => trace!(key = %guard.key, "Renewed lock lease"),
                Ok(false) => {
                    return CacheError::Operation(format!(
                        "lease on '{}' lapsed before renewal",
                        guard.key
                    ))
                }
                Err(e) => return e,
            }
        }
    }
}
