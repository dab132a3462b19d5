use super::ExistenceFilter;
use crate::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use snip_core::{CacheError, ShortCode};
use tracing::trace;
use typed_builder::TypedBuilder;

/// Configuration for the Bloom filter.
///
/// The Bloom filter is a probabilistic data structure that trades a small
/// false positive rate for significant memory savings.
#[derive(Debug, Clone, TypedBuilder)]
pub struct BloomFilterConfig {
    /// Expected number of items to be inserted into the filter.
    ///
    /// Setting this too low will increase the false positive rate once the
    /// filter fills up.
    pub expected_items: usize,

    /// Desired false positive rate as a probability between 0.0 and 1.0.
    ///
    /// For example, a value of 0.01 means approximately 1% false positive rate.
    /// Lower values use more memory but reduce false positives.
    pub false_positive_rate: f64,
}

/// An in-process existence filter.
///
/// Membership lives in this process only, so this suits a single node or
/// tests. A fleet needs a shared filter such as [`RedisBloomFilter`](super::RedisBloomFilter),
/// otherwise a code created on one node looks unissued on another.
pub struct BloomFilter {
    bloom: RwLock<bloomfilter::Bloom<ShortCode>>,
}

impl BloomFilter {
    /// Creates an empty filter sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Initialization` if the parameters cannot size a
    /// filter.
    pub fn new(config: BloomFilterConfig) -> Result<Self> {
        let bloom =
            bloomfilter::Bloom::new_for_fp_rate(config.expected_items, config.false_positive_rate)
                .map_err(|e| CacheError::Initialization(e.to_string()))?;
        Ok(Self {
            bloom: RwLock::new(bloom),
        })
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter").finish_non_exhaustive()
    }
}

#[async_trait]
impl ExistenceFilter for BloomFilter {
    async fn insert(&self, code: &ShortCode) -> Result<()> {
        self.bloom.write().set(code);
        trace!(code = %code, "Added code to bloom filter");
        Ok(())
    }

    async fn might_contain(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.bloom.read().check(code))
    }
}
