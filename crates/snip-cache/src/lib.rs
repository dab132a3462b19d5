//! The read-through cache that sits between the mapping service and the store.
//!
//! Three backends cooperate here:
//!
//! - an [`ExistenceFilter`] answering "was this code ever issued?" with no
//!   false negatives,
//! - a [`UrlCache`] holding materialized mappings keyed by code,
//! - a [`DistributedLock`] serializing cache misses for the same code.
//!
//! Each comes with an in-process implementation (single node, tests) and a
//! Redis implementation (fleet-wide). [`ReadThroughCache`] composes them
//! around any [`Repository`](snip_core::Repository).
//!
//! # Example (in-process)
//!
//! ```rust
//! use snip_cache::{BloomFilter, BloomFilterConfig, LocalLock, LockConfig, MokaUrlCache, ReadThroughCache};
//! use snip_storage::InMemoryRepository;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let filter = BloomFilter::new(
//!     BloomFilterConfig::builder()
//!         .expected_items(1_000_000)
//!         .false_positive_rate(0.001)
//!         .build(),
//! )?;
//! let _engine = ReadThroughCache::new(
//!     InMemoryRepository::new(),
//!     filter,
//!     MokaUrlCache::new(),
//!     LocalLock::new(LockConfig::default()),
//! );
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod engine;
pub mod filter;
pub mod lock;
pub mod moka;
pub mod redis;

pub use crate::cache::UrlCache;
pub use crate::engine::ReadThroughCache;
pub use crate::filter::{
    BloomFilter, BloomFilterConfig, ExistenceFilter, RedisBloomConfig, RedisBloomFilter,
};
pub use crate::lock::{DistributedLock, LocalLock, LockConfig, RedisLock};
pub use crate::moka::MokaUrlCache;
pub use crate::redis::RedisUrlCache;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, snip_core::CacheError>;
