//! Core types and traits for the snip URL shortener.
//!
//! This crate provides the domain model shared by the generator, the
//! cache engine, the storage adapters and the mapping service: short
//! codes, stored mappings, the validity rules, the clock capability and
//! the error taxonomy.

pub mod clock;
pub mod error;
pub mod mapping;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, MappingError, StorageError};
pub use mapping::{ShortUrl, UrlMapping};
pub use repository::Repository;
pub use shortcode::ShortCode;
pub use shortener::Shortener;
