//! Existence filters for fast negative lookups.
//!
//! A filter records every code the service has ever tried to create. It can
//! say with certainty that a code was never issued, or that it might have
//! been (with a configurable false positive rate). Entries are never
//! removed.

mod bloom;
mod redis_bloom;

pub use bloom::{BloomFilter, BloomFilterConfig};
pub use redis_bloom::{RedisBloomConfig, RedisBloomFilter};

use crate::Result;
use async_trait::async_trait;
use snip_core::ShortCode;
use std::sync::Arc;

/// An add-only probabilistic set of issued codes.
#[async_trait]
pub trait ExistenceFilter: Send + Sync + 'static {
    /// Records `code` as issued.
    async fn insert(&self, code: &ShortCode) -> Result<()>;

    /// Returns `false` only if `code` was definitely never inserted.
    async fn might_contain(&self, code: &ShortCode) -> Result<bool>;
}

#[async_trait]
impl<F: ExistenceFilter + ?Sized> ExistenceFilter for Arc<F> {
    async fn insert(&self, code: &ShortCode) -> Result<()> {
        (**self).insert(code).await
    }

    async fn might_contain(&self, code: &ShortCode) -> Result<bool> {
        (**self).might_contain(code).await
    }
}
