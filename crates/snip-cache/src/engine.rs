use crate::cache::UrlCache;
use crate::filter::ExistenceFilter;
use crate::lock::DistributedLock;
use async_trait::async_trait;
use snip_core::{CacheError, Repository, ShortCode, StorageError, UrlMapping};
use tracing::{debug, trace, warn};

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

const LOCK_PREFIX: &str = "lock:shorturl:";

/// The lock key guarding cache fills for `code`.
pub fn fill_lock_key(code: &ShortCode) -> String {
    format!("{LOCK_PREFIX}{code}")
}

/// A repository decorator that answers reads from an existence filter and
/// a materialized cache before touching the store.
///
/// Reads follow a fixed order:
///
/// 1. The filter rules out codes that were never issued without any I/O
///    against the cache or the store.
/// 2. A cache hit is returned as is.
/// 3. On a miss, the per-code lock is taken and the cache checked again, so
///    a burst of concurrent misses for one code costs a single store read.
/// 4. The store result is written back to the cache on a best-effort basis.
///
/// The lock lease is renewed for as long as the locked section runs. An
/// entry the cache cannot decode counts as a miss and is overwritten by the
/// refill.
///
/// Writes record the code in the filter before the store sees it, so the
/// filter never reports a stored code as absent. The cache is only
/// populated by reads.
#[derive(Debug, Clone)]
pub struct ReadThroughCache<R, F, C, L> {
    store: R,
    filter: F,
    cache: C,
    lock: L,
}

impl<R, F, C, L> ReadThroughCache<R, F, C, L>
where
    R: Repository,
    F: ExistenceFilter,
    C: UrlCache,
    L: DistributedLock,
{
    pub fn new(store: R, filter: F, cache: C, lock: L) -> Self {
        Self {
            store,
            filter,
            cache,
            lock,
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }

    // Runs with the per-code lock held.
    async fn load_locked(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        match self.cache.get_url(code).await {
            Ok(Some(mapping)) => {
                trace!(code = %code, "Cache filled by another holder");
                return Ok(Some(mapping));
            }
            Ok(None) => {}
            Err(e) => {
                // the store stays authoritative, a broken cache costs one extra read
                warn!(code = %code, error = %e, "Cache re-check failed, reading store");
            }
        }

        let Some(mapping) = self.store.get(code).await? else {
            debug!(code = %code, "Code passed the filter but is not stored");
            return Ok(None);
        };

        if let Err(e) = self.cache.set_url(code, &mapping).await {
            warn!(code = %code, error = %e, "Failed to populate cache");
        }
        Ok(Some(mapping))
    }
}

#[async_trait]
impl<R, F, C, L> Repository for ReadThroughCache<R, F, C, L>
where
    R: Repository,
    F: ExistenceFilter,
    C: UrlCache,
    L: DistributedLock,
{
    async fn insert(&self, mapping: &UrlMapping) -> Result<UrlMapping> {
        self.filter.insert(&mapping.code).await?;
        self.store.insert(mapping).await
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        if !self.filter.might_contain(code).await? {
            trace!(code = %code, "Filter rules out code");
            return Ok(None);
        }

        match self.cache.get_url(code).await {
            Ok(Some(mapping)) => {
                trace!(code = %code, "Cache hit");
                return Ok(Some(mapping));
            }
            Ok(None) => {}
            Err(CacheError::InvalidData(e)) => {
                warn!(code = %code, error = %e, "Undecodable cache entry, refilling");
            }
            Err(e) => return Err(e.into()),
        }

        trace!(code = %code, "Cache miss, taking fill lock");
        let key = fill_lock_key(code);
        let guard = self.lock.acquire(&key).await?;

        let mut load = std::pin::pin!(self.load_locked(code));
        let result = tokio::select! {
            result = &mut load => result,
            err = self.lock.keep_alive(&guard) => {
                warn!(key, error = %err, "Fill lock lease lost, finishing read unguarded");
                load.await
            }
        };

        if let Err(e) = self.lock.release(guard).await {
            warn!(key, error = %e, "Failed to release fill lock");
        }
        result
    }
}
