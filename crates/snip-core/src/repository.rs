use crate::error::StorageError;
use crate::mapping::UrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The durable owner of mappings.
///
/// Mappings are written once and never updated, so the contract is just
/// insert and point lookup. Stores do not evaluate expiry; that is the
/// mapping service's job on every read.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new mapping. Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, mapping: &UrlMapping) -> Result<UrlMapping>;

    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;
}

#[async_trait]
impl<R: Repository + ?Sized> Repository for Arc<R> {
    async fn insert(&self, mapping: &UrlMapping) -> Result<UrlMapping> {
        (**self).insert(mapping).await
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        (**self).get(code).await
    }
}
