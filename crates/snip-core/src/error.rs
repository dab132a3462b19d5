use thiserror::Error;

/// Result type for the mapping service and the cache engine.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Failures of the filter, materialized cache and lock backends.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Failures of the backing store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// The error taxonomy callers of the mapping service observe.
///
/// Expired and malformed mappings are reported as [`MappingError::NotFound`]
/// so that a response never reveals whether an expired code once existed.
#[derive(Debug, Clone, Error)]
pub enum MappingError {
    #[error("short url not found")]
    NotFound,
    #[error("short url invalid: {0}")]
    Invalid(String),
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl MappingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MappingError::NotFound)
    }
}

impl From<CacheError> for MappingError {
    fn from(value: CacheError) -> Self {
        MappingError::Unavailable(value.to_string())
    }
}

impl From<StorageError> for MappingError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => MappingError::Conflict(code),
            other => MappingError::Unavailable(other.to_string()),
        }
    }
}
