//! # SQLite implementation
//!
//! Maps between the relational schema in `migrations/` and the `domains`
//! models. Every repository wraps the same `SqlitePool`; enums are stored as
//! their lowercase text form and timestamps as RFC 3339 text.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use domains::ports::HealthCheck;
use domains::{DomainError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

mod artworks;
mod categories;
mod discoveries;
mod moderation;
mod rows;
mod social;
mod users;

pub use artworks::SqliteArtworkRepository;
pub use categories::SqliteCategoryRepository;
pub use discoveries::SqliteDiscoveryRepository;
pub use moderation::SqliteModerationRepository;
pub use social::SqliteSocialRepository;
pub use users::SqliteUserRepository;

/// Opens a pool on `url`, creating the database file if needed.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// A single-connection in-memory database that lives as long as the pool.
///
/// With more than one connection each would see its own empty database, so
/// the connection is never recycled.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Applies the embedded migrations.
pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub(crate) fn storage_err(err: sqlx::Error) -> DomainError {
    DomainError::Storage(err.into())
}

/// Maps a UNIQUE violation to `Conflict(message)`, anything else to `Storage`.
pub(crate) fn unique_or_storage(message: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |err| match err.as_database_error() {
        Some(db) if db.is_unique_violation() => DomainError::conflict(message),
        _ => storage_err(err),
    }
}

pub struct SqliteHealthCheck {
    pool: SqlitePool,
}

impl SqliteHealthCheck {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for SqliteHealthCheck {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrated_database_answers_pings() {
        let pool = testing::pool().await;
        let health = SqliteHealthCheck::new(pool);
        health.ping().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = testing::pool().await;
        let orphan = testing::insert_user(&pool, "ghost", "artist").await + 100;
        let result = sqlx::query(
            "INSERT INTO artworks (title, latitude, longitude, artist_id, created_at) \
             VALUES ('x', 0, 0, ?, '2024-01-01T00:00:00+00:00')",
        )
        .bind(orphan)
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
