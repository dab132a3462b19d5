use crate::{Result, UrlCache};
use async_trait::async_trait;
use moka::future::Cache;
use snip_core::{ShortCode, UrlMapping};
use tracing::{debug, trace};

const DEFAULT_CAPACITY: u64 = 10_000;

/// An in-memory cache implementation using Moka.
///
/// Entries carry no TTL; they leave only through capacity eviction. That
/// is safe because expiry is decided from the mapping's own timestamps on
/// every read, never by the cache.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, UrlMapping>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding up to 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        Self { cache }
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        match self.cache.get(code.as_str()).await {
            Some(mapping) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(mapping))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, mapping: &UrlMapping) -> Result<()> {
        self.cache
            .insert(code.as_str().to_owned(), mapping.clone())
            .await;
        debug!(code = %code, "Cached mapping in Moka");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn mapping(code: &str, url: &str) -> UrlMapping {
        UrlMapping {
            code: ShortCode::new_unchecked(code),
            target_url: url.to_string(),
            created_at: 1_700_000_000,
            expires_at: 1_700_003_600,
        }
    }

    #[tokio::test]
    async fn cache_get_and_set() {
        let cache = MokaUrlCache::new();
        let c = code("2-3");
        let m = mapping("2-3", "https://example.com");

        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache.set_url(&c, &m).await.unwrap();

        assert_eq!(cache.get_url(&c).await.unwrap(), Some(m));
    }

    #[tokio::test]
    async fn set_overwrites_previous_entry() {
        let cache = MokaUrlCache::new();
        let c = code("2-3");

        cache
            .set_url(&c, &mapping("2-3", "https://old.example.com"))
            .await
            .unwrap();
        cache
            .set_url(&c, &mapping("2-3", "https://new.example.com"))
            .await
            .unwrap();

        let cached = cache.get_url(&c).await.unwrap().unwrap();
        assert_eq!(cached.target_url, "https://new.example.com");
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = MokaUrlCache::with_capacity(100);
        let other = cache.clone();
        let c = code("2-3");

        cache
            .set_url(&c, &mapping("2-3", "https://example.com"))
            .await
            .unwrap();

        assert!(other.get_url(&c).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cache_handles_many_entries() {
        let cache = MokaUrlCache::with_capacity(100);

        for i in 0..50 {
            let c = code(&format!("2-{i}"));
            cache
                .set_url(&c, &mapping(c.as_str(), &format!("https://example{i}.com")))
                .await
                .unwrap();
        }

        assert_eq!(
            cache.get_url(&code("2-0")).await.unwrap().unwrap().target_url,
            "https://example0.com"
        );
        assert_eq!(
            cache.get_url(&code("2-49")).await.unwrap().unwrap().target_url,
            "https://example49.com"
        );
    }
}
