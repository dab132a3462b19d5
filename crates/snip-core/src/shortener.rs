use crate::error::Result;
use crate::mapping::ShortUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;

/// The create/resolve use cases behind the HTTP surface.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens `target_url`, valid until `expires_at` (Unix seconds).
    ///
    /// Fails with `Invalid` when the candidate mapping does not pass the
    /// validity rules.
    async fn create(&self, target_url: &str, expires_at: u64) -> Result<ShortUrl>;

    /// Resolves a short code.
    ///
    /// Fails with `NotFound` if the code was never issued, has expired, or
    /// the stored mapping is malformed.
    async fn get(&self, code: &ShortCode) -> Result<ShortUrl>;
}

#[async_trait]
impl<S: Shortener + ?Sized> Shortener for Arc<S> {
    async fn create(&self, target_url: &str, expires_at: u64) -> Result<ShortUrl> {
        (**self).create(target_url, expires_at).await
    }

    async fn get(&self, code: &ShortCode) -> Result<ShortUrl> {
        (**self).get(code).await
    }
}
