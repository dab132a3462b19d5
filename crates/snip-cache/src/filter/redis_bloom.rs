use super::ExistenceFilter;
use crate::redis::map_redis_error;
use crate::Result;
use async_trait::async_trait;
use snip_core::ShortCode;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Settings for a RedisBloom-backed filter.
///
/// `capacity` and `error_rate` only take effect when the first insert
/// creates the filter; later inserts reuse whatever the key already holds.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisBloomConfig {
    #[builder(default = "bf:shorturl".to_string(), setter(into))]
    pub key: String,
    #[builder(default = 10_000_000_000)]
    pub capacity: u64,
    #[builder(default = 0.000_001)]
    pub error_rate: f64,
}

impl Default for RedisBloomConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// An existence filter shared by every node through the RedisBloom module
/// (`BF.INSERT` / `BF.EXISTS`).
#[derive(Debug, Clone)]
pub struct RedisBloomFilter {
    conn: redis::aio::MultiplexedConnection,
    config: RedisBloomConfig,
}

impl RedisBloomFilter {
    pub fn new(conn: redis::aio::MultiplexedConnection, config: RedisBloomConfig) -> Self {
        Self { conn, config }
    }
}

#[async_trait]
impl ExistenceFilter for RedisBloomFilter {
    async fn insert(&self, code: &ShortCode) -> Result<()> {
        let mut conn = self.conn.clone();
        let added: Vec<i64> = redis::cmd("BF.INSERT")
            .arg(&self.config.key)
            .arg("CAPACITY")
            .arg(self.config.capacity)
            .arg("ERROR")
            .arg(self.config.error_rate)
            .arg("ITEMS")
            .arg(code.as_str())
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(code = %code, error = %e, "Failed to add code to Redis bloom filter");
                map_redis_error("failed to insert into bloom filter", e)
            })?;
        debug!(code = %code, newly_added = ?added.first(), "Added code to Redis bloom filter");
        Ok(())
    }

    async fn might_contain(&self, code: &ShortCode) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = redis::cmd("BF.EXISTS")
            .arg(&self.config.key)
            .arg(code.as_str())
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(code = %code, error = %e, "Failed to query Redis bloom filter");
                map_redis_error("failed to query bloom filter", e)
            })?;
        trace!(code = %code, exists, "Checked Redis bloom filter");
        Ok(exists)
    }
}
