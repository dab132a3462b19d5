use crate::Result;
use async_trait::async_trait;
use snip_core::{ShortCode, UrlMapping};
use std::sync::Arc;

/// A cache of materialized mappings.
///
/// The cache is never authoritative: entries are not expired by the cache
/// itself, and readers re-check validity on every hit.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get a mapping from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Store a mapping in cache, overwriting any previous entry.
    async fn set_url(&self, code: &ShortCode, mapping: &UrlMapping) -> Result<()>;
}

#[async_trait]
impl<C: UrlCache + ?Sized> UrlCache for Arc<C> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        (**self).get_url(code).await
    }

    async fn set_url(&self, code: &ShortCode, mapping: &UrlMapping) -> Result<()> {
        (**self).set_url(code, mapping).await
    }
}
