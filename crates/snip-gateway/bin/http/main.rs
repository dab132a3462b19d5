mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use snip_cache::{
    BloomFilter, BloomFilterConfig, LocalLock, LockConfig, MokaUrlCache, ReadThroughCache,
    RedisBloomConfig, RedisBloomFilter, RedisLock, RedisUrlCache,
};
use snip_core::{Repository, Shortener, SystemClock};
use snip_gateway::{App, AppState};
use snip_generator::SeqGenerator;
use snip_shortener::{HostConfig, LoggingShortener, MappingService};
use snip_storage::{InMemoryRepository, PostgresRepository};
use tracing::info;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    snip_telemetry::init(config.log_format.into())?;

    info!(
        listen_addr = %config.listen_addr,
        public_host = %config.public_host,
        instance_id = config.instance_id,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting snip gateway"
    );

    let store = open_store(&config).await?;
    let shortener = build_shortener(&config, store).await?;

    let router = App::router(AppState::new(shortener));
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn open_store(config: &CLI) -> anyhow::Result<Arc<dyn Repository>> {
    Ok(match config.storage {
        StorageBackendArg::InMemory => Arc::new(InMemoryRepository::new()),
        StorageBackendArg::Postgres => {
            let dsn = config
                .postgres_dsn
                .as_deref()
                .context("postgres dsn is required when storage backend is postgres")?;
            Arc::new(PostgresRepository::connect(dsn).await?)
        }
    })
}

async fn build_shortener(
    config: &CLI,
    store: Arc<dyn Repository>,
) -> anyhow::Result<Arc<dyn Shortener>> {
    let lock_config = LockConfig::builder()
        .acquire_timeout(Duration::from_millis(config.lock_timeout_ms))
        .lease(Duration::from_millis(config.lock_lease_ms))
        .build();

    Ok(match config.cache {
        CacheBackendArg::InMemory => {
            let expected_items = usize::try_from(config.filter_capacity)
                .context("filter capacity does not fit this platform")?;
            let filter = BloomFilter::new(
                BloomFilterConfig::builder()
                    .expected_items(expected_items)
                    .false_positive_rate(config.filter_fp_rate)
                    .build(),
            )?;
            let engine = ReadThroughCache::new(
                store,
                filter,
                MokaUrlCache::new(),
                LocalLock::new(lock_config),
            );
            service(config, engine)
        }
        CacheBackendArg::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let conn = redis::Client::open(url)?
                .get_multiplexed_async_connection()
                .await?;
            let filter = RedisBloomFilter::new(
                conn.clone(),
                RedisBloomConfig::builder()
                    .capacity(config.filter_capacity)
                    .error_rate(config.filter_fp_rate)
                    .build(),
            );
            let engine = ReadThroughCache::new(
                store,
                filter,
                RedisUrlCache::new(conn.clone()),
                RedisLock::new(conn, lock_config),
            );
            service(config, engine)
        }
    })
}

fn service<R: Repository>(config: &CLI, engine: R) -> Arc<dyn Shortener> {
    let service = MappingService::new(
        SeqGenerator::new(config.instance_id),
        engine,
        SystemClock,
        HostConfig::new(config.public_host.clone()),
    );
    Arc::new(LoggingShortener::new(service))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
