use async_trait::async_trait;
use snip_core::error::Result;
use snip_core::{MappingError, ShortCode, ShortUrl, Shortener};
use std::time::Instant;
use tracing::{info, warn};

/// Wraps a [`Shortener`] and emits one structured event per call with its
/// outcome and latency. Results pass through untouched.
#[derive(Debug, Clone)]
pub struct LoggingShortener<S> {
    inner: S,
}

impl<S: Shortener> LoggingShortener<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn outcome(err: &MappingError) -> &'static str {
    match err {
        MappingError::NotFound => "not_found",
        MappingError::Invalid(_) => "invalid",
        MappingError::Conflict(_) => "conflict",
        MappingError::Unavailable(_) => "unavailable",
    }
}

#[async_trait]
impl<S: Shortener> Shortener for LoggingShortener<S> {
    async fn create(&self, target_url: &str, expires_at: u64) -> Result<ShortUrl> {
        let started = Instant::now();
        let result = self.inner.create(target_url, expires_at).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

        match &result {
            Ok(short) => info!(
                op = "create",
                code = %short.code,
                target_url,
                expires_at,
                elapsed_ms,
                "Created short url"
            ),
            Err(MappingError::Unavailable(e)) => warn!(
                op = "create",
                target_url,
                error = %e,
                elapsed_ms,
                "Create failed"
            ),
            Err(e) => info!(
                op = "create",
                target_url,
                outcome = outcome(e),
                elapsed_ms,
                "Create rejected"
            ),
        }
        result
    }

    async fn get(&self, code: &ShortCode) -> Result<ShortUrl> {
        let started = Instant::now();
        let result = self.inner.get(code).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

        match &result {
            Ok(_) => info!(op = "get", code = %code, outcome = "ok", elapsed_ms, "Resolved short url"),
            Err(MappingError::Unavailable(e)) => {
                warn!(op = "get", code = %code, error = %e, elapsed_ms, "Resolve failed")
            }
            Err(e) => info!(op = "get", code = %code, outcome = outcome(e), elapsed_ms, "Resolve missed"),
        }
        result
    }
}
