use async_trait::async_trait;
use snip_core::repository::{Repository, Result};
use snip_core::{ShortCode, StorageError, UrlMapping};
use sqlx::{PgPool, Row};
use tracing::debug;

/// Postgres implementation of the repository contract.
///
/// Rows live in `short_urls`, keyed by `short_code`. Timestamps are stored
/// as `BIGINT` Unix seconds; values that do not fit the domain's unsigned
/// range are rejected as invalid data.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing Postgres connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Query(format!("migration failed: {e}")))?;
        debug!("Postgres schema is up to date");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_column(field: &str, value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| StorageError::InvalidData(format!("{field} {value} is out of range")))
}

fn from_column(field: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| StorageError::InvalidData(format!("stored {field} {value} is negative")))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert(&self, mapping: &UrlMapping) -> Result<UrlMapping> {
        let expire_at = to_column("expire_at", mapping.expires_at)?;
        let created_at = to_column("created_at", mapping.created_at)?;

        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (short_code, original_url, expire_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(mapping.code.as_str())
        .bind(&mapping.target_url)
        .bind(expire_at)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(mapping.clone()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(mapping.code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT original_url, expire_at, created_at
            FROM short_urls
            WHERE short_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let target_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
        let expire_at: i64 = row.try_get("expire_at").map_err(map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

        Ok(Some(UrlMapping {
            code: code.clone(),
            target_url,
            created_at: from_column("created_at", created_at)?,
            expires_at: from_column("expire_at", expire_at)?,
        }))
    }
}
