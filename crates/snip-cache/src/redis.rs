use crate::{Result, UrlCache};
use async_trait::async_trait;
use redis::AsyncCommands;
use snip_core::{CacheError, ShortCode, UrlMapping};
use tracing::{debug, trace, warn};

/// Namespace for materialized mappings in a shared Redis.
pub const DEFAULT_KEY_PREFIX: &str = "shorturl:";

/// A Redis-based implementation of [`UrlCache`].
///
/// This implementation stores mappings as JSON strings in Redis,
/// using a configurable key prefix. Keys are written without a TTL.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

pub(crate) fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Generates the cache key for a short code.
    pub fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching mapping from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(cached)) => {
                debug!(code = %code, "Cache hit in Redis");
                serde_json::from_str::<UrlMapping>(&cached).map(Some).map_err(|e| {
                    warn!(code = %code, error = %e, "Failed to deserialize cached mapping");
                    CacheError::InvalidData(format!("invalid cached value for key '{key}': {e}"))
                })
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, mapping: &UrlMapping) -> Result<()> {
        let key = self.cache_key(code);
        trace!(code = %code, "Storing mapping in Redis cache");

        let json = serde_json::to_string(mapping).map_err(|e| {
            CacheError::Serialization(format!("failed to serialize cache value: {e}"))
        })?;

        let mut conn = self.conn.clone();
        match conn.set::<_, _, ()>(&key, json).await {
            Ok(()) => {
                debug!(code = %code, "Cached mapping in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to cache mapping in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}

// Tests against a live Redis live in tests/redis_backends_integration.rs.
