//! Durable owners of URL mappings.
//!
//! Both stores write each code once and never update it. Expiry is not
//! evaluated here; readers decide validity against their own clock.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use snip_core::{Repository, StorageError};
