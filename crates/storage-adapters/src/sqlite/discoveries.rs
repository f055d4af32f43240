use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::ports::DiscoveryRepository;
use domains::{Discovery, DiscoveryOutcome, Result};
use sqlx::{FromRow, SqlitePool};

use super::storage_err;

#[derive(Debug, FromRow)]
struct DiscoveryRow {
    id: i64,
    user_id: i64,
    artwork_id: i64,
    discovered_at: DateTime<Utc>,
}

impl From<DiscoveryRow> for Discovery {
    fn from(row: DiscoveryRow) -> Self {
        Discovery {
            id: row.id,
            user_id: row.user_id,
            artwork_id: row.artwork_id,
            discovered_at: row.discovered_at,
        }
    }
}

pub struct SqliteDiscoveryRepository {
    pool: SqlitePool,
}

impl SqliteDiscoveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscoveryRepository for SqliteDiscoveryRepository {
    /// Relies on UNIQUE (user_id, artwork_id): concurrent unlocks of the
    /// same pair insert once and both read back the surviving row.
    async fn record(&self, user_id: i64, artwork_id: i64) -> Result<DiscoveryOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO discoveries (user_id, artwork_id, discovered_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, artwork_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(artwork_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?
        .rows_affected();

        let row = sqlx::query_as::<_, DiscoveryRow>(
            "SELECT id, user_id, artwork_id, discovered_at FROM discoveries \
             WHERE user_id = ? AND artwork_id = ?",
        )
        .bind(user_id)
        .bind(artwork_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(DiscoveryOutcome {
            discovery: row.into(),
            created: inserted == 1,
        })
    }

    async fn unlocked_artwork_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT artwork_id FROM discoveries WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(ids.into_iter().collect())
    }
}
