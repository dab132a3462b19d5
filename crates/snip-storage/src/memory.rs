use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use snip_core::repository::{Repository, Result};
use snip_core::{ShortCode, StorageError, UrlMapping};
use tracing::trace;

/// In-memory implementation of the Repository trait using DashMap.
///
/// Entries are kept exactly as inserted, expired ones included. The
/// check-and-insert runs under the shard lock for the key, so two racing
/// inserts of one code cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlMapping>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, mapping: &UrlMapping) -> Result<UrlMapping> {
        match self.storage.entry(mapping.code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(mapping.code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(mapping.clone());
                trace!(code = %mapping.code, "Stored mapping in memory");
                Ok(mapping.clone())
            }
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self.storage.get(code.as_str()).map(|entry| entry.clone()))
    }
}
