use crate::host::HostConfig;
use async_trait::async_trait;
use snip_core::error::Result;
use snip_core::{Clock, MappingError, Repository, ShortCode, ShortUrl, Shortener, UrlMapping};
use snip_generator::Generator;
use tracing::{debug, trace};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a code generator, a repository (normally
/// `snip_cache::ReadThroughCache` over the real store) and a clock to
/// handle:
/// - Short code issuance
/// - Validation of candidate mappings at creation
/// - Lazy expiry on every read
/// - Deriving the public short URL from the current host
///
/// The generator is responsible for uniqueness. No collision retry is
/// performed; a duplicate surfaces as `Conflict`.
#[derive(Debug, Clone)]
pub struct MappingService<G, R, K> {
    generator: G,
    repository: R,
    clock: K,
    host: HostConfig,
}

impl<G: Generator, R: Repository, K: Clock> MappingService<G, R, K> {
    pub fn new(generator: G, repository: R, clock: K, host: HostConfig) -> Self {
        Self {
            generator,
            repository,
            clock,
            host,
        }
    }

    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[async_trait]
impl<G: Generator, R: Repository, K: Clock> Shortener for MappingService<G, R, K> {
    async fn create(&self, target_url: &str, expires_at: u64) -> Result<ShortUrl> {
        let code = self.generator.next_code();
        let now = self.clock.now();

        let candidate = UrlMapping {
            code,
            target_url: target_url.to_owned(),
            created_at: now,
            expires_at,
        };

        if !candidate.is_valid(now) {
            debug!(code = %candidate.code, "Rejected candidate mapping");
            return Err(MappingError::Invalid(format!(
                "mapping for '{target_url}' expiring at {expires_at} is not valid at {now}"
            )));
        }

        let stored = self.repository.insert(&candidate).await?;
        Ok(ShortUrl::from_mapping(stored, &self.host.get()))
    }

    async fn get(&self, code: &ShortCode) -> Result<ShortUrl> {
        let mapping = self
            .repository
            .get(code)
            .await?
            .ok_or(MappingError::NotFound)?;

        let now = self.clock.now();
        if !mapping.is_valid(now) {
            // expired and malformed mappings are indistinguishable from absent ones
            trace!(code = %code, now, expires_at = mapping.expires_at, "Mapping not valid");
            return Err(MappingError::NotFound);
        }

        Ok(ShortUrl::from_mapping(mapping, &self.host.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snip_cache::{
        BloomFilter, BloomFilterConfig, LocalLock, MokaUrlCache, ReadThroughCache, UrlCache,
    };
    use snip_core::{ManualClock, StorageError};
    use snip_generator::SeqGenerator;
    use snip_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const NOW: u64 = 1_700_000_000;
    const HOST: &str = "https://sn.ip";

    #[derive(Debug, Default)]
    struct CountingRepository {
        inner: InMemoryRepository,
        reads: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl Repository for CountingRepository {
        async fn insert(
            &self,
            mapping: &UrlMapping,
        ) -> std::result::Result<UrlMapping, StorageError> {
            self.inner.insert(mapping).await
        }

        async fn get(
            &self,
            code: &ShortCode,
        ) -> std::result::Result<Option<UrlMapping>, StorageError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.get(code).await
        }
    }

    /// Hands out the same code forever.
    struct FixedGenerator(&'static str);

    impl Generator for FixedGenerator {
        fn next_code(&self) -> ShortCode {
            ShortCode::new_unchecked(self.0)
        }
    }

    type Engine = ReadThroughCache<Arc<CountingRepository>, BloomFilter, MokaUrlCache, LocalLock>;

    struct Harness<G> {
        service: MappingService<G, Engine, ManualClock>,
        store: Arc<CountingRepository>,
        cache: MokaUrlCache,
        clock: ManualClock,
        host: HostConfig,
    }

    fn harness<G: Generator>(generator: G) -> Harness<G> {
        harness_over(generator, CountingRepository::default())
    }

    fn harness_over<G: Generator>(generator: G, store: CountingRepository) -> Harness<G> {
        let store = Arc::new(store);
        let cache = MokaUrlCache::new();
        let filter = BloomFilter::new(
            BloomFilterConfig::builder()
                .expected_items(1_000)
                .false_positive_rate(0.001)
                .build(),
        )
        .unwrap();
        let engine = ReadThroughCache::new(store.clone(), filter, cache.clone(), LocalLock::default());
        let clock = ManualClock::new(NOW);
        let host = HostConfig::new(HOST);

        Harness {
            service: MappingService::new(generator, engine, clock.clone(), host.clone()),
            store,
            cache,
            clock,
            host,
        }
    }

    fn reads(store: &CountingRepository) -> usize {
        store.reads.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn create_then_get() {
        let h = harness(SeqGenerator::new(0));

        let created = h.service.create("https://example.com", NOW + 3600).await.unwrap();
        assert_eq!(created.code.as_str(), "2-3");
        assert_eq!(created.short_url, "https://sn.ip/2-3");
        assert_eq!(created.created_at, NOW);

        let got = h.service.get(&created.code).await.unwrap();
        assert_eq!(got.target_url, "https://example.com");
        assert_eq!(got.short_url, "https://sn.ip/2-3");
        assert_eq!(got, created);
    }

    #[tokio::test]
    async fn create_does_not_fill_cache() {
        let h = harness(SeqGenerator::new(0));

        let created = h.service.create("https://example.com", NOW + 3600).await.unwrap();

        assert!(h.cache.get_url(&created.code).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_code_is_not_found_without_store_read() {
        let h = harness(SeqGenerator::new(0));

        let err = h
            .service
            .get(&ShortCode::new_unchecked("9-zz"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(reads(&h.store), 0);
    }

    #[tokio::test]
    async fn expired_code_is_not_found() {
        let h = harness(SeqGenerator::new(0));
        let created = h.service.create("https://example.com", NOW + 60).await.unwrap();

        // warm the cache so the expired copy is served from it
        h.service.get(&created.code).await.unwrap();
        h.clock.advance(61);

        let err = h.service.get(&created.code).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(h.store.inner.get(&created.code).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expiry_instant_is_still_readable() {
        let h = harness(SeqGenerator::new(0));
        let created = h.service.create("https://example.com", NOW + 60).await.unwrap();

        h.clock.advance(60);
        assert!(h.service.get(&created.code).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_candidates_are_rejected() {
        let h = harness(SeqGenerator::new(0));

        for (url, expires_at) in [
            ("https://example.com", 0),
            ("https://example.com", NOW - 1),
            ("", NOW + 3600),
            ("not a url", NOW + 3600),
            ("/relative/path", NOW + 3600),
        ] {
            let err = h.service.create(url, expires_at).await.unwrap_err();
            assert!(
                matches!(err, MappingError::Invalid(_)),
                "expected Invalid for ({url:?}, {expires_at}), got {err:?}"
            );
        }
        assert!(h.store.inner.is_empty());
    }

    #[tokio::test]
    async fn host_change_applies_to_cached_entries() {
        let h = harness(SeqGenerator::new(0));
        let created = h.service.create("https://example.com", NOW + 3600).await.unwrap();

        let first = h.service.get(&created.code).await.unwrap();
        assert_eq!(first.short_url, "https://sn.ip/2-3");

        h.host.set("https://short.example/");
        let second = h.service.get(&created.code).await.unwrap();
        assert_eq!(second.short_url, "https://short.example/2-3");

        // both reads after the first came from cache
        assert_eq!(reads(&h.store), 1);
    }

    #[tokio::test]
    async fn duplicate_code_is_conflict() {
        let h = harness(FixedGenerator("2-3"));

        h.service.create("https://example.com", NOW + 3600).await.unwrap();
        let err = h
            .service
            .create("https://other.example", NOW + 3600)
            .await
            .unwrap_err();

        assert!(matches!(err, MappingError::Conflict(code) if code == "2-3"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_cold_reads_hit_store_once() {
        let slow_store = CountingRepository {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let h = harness_over(SeqGenerator::new(0), slow_store);
        let created = h.service.create("https://example.com", NOW + 3600).await.unwrap();
        let service = Arc::new(h.service);

        let mut handles = vec![];
        for _ in 0..16 {
            let service = service.clone();
            let code = created.code.clone();
            handles.push(tokio::spawn(async move { service.get(&code).await }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), created);
        }
        assert_eq!(reads(&h.store), 1);
    }
}
