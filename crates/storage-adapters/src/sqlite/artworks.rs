use async_trait::async_trait;
use chrono::Utc;
use domains::ports::ArtworkRepository;
use domains::{Artwork, ArtworkFilter, ArtworkPatch, DomainError, NewArtwork, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

use super::rows::{convert_all, ArtworkRow, ARTWORK_SELECT};
use super::storage_err;

pub struct SqliteArtworkRepository {
    pool: SqlitePool,
}

impl SqliteArtworkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(crate) async fn fetch_artwork<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Artwork>> {
    sqlx::query_as::<_, ArtworkRow>(&format!("{ARTWORK_SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(storage_err)?
        .map(Artwork::try_from)
        .transpose()
}

/// Links `category_ids` that exist; duplicates are ignored.
async fn link_categories(
    conn: &mut SqliteConnection,
    artwork_id: i64,
    category_ids: &[i64],
) -> Result<u64> {
    let mut added = 0;
    for category_id in category_ids {
        added += sqlx::query(
            "INSERT OR IGNORE INTO artwork_categories (artwork_id, category_id) \
             SELECT ?, id FROM categories WHERE id = ?",
        )
        .bind(artwork_id)
        .bind(category_id)
        .execute(&mut *conn)
        .await
        .map_err(storage_err)?
        .rows_affected();
    }
    Ok(added)
}

#[async_trait]
impl ArtworkRepository for SqliteArtworkRepository {
    /// Inserts the artwork and its category links atomically.
    async fn create(&self, artwork: NewArtwork) -> Result<Artwork> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let id = sqlx::query(
            "INSERT INTO artworks (title, description, image_url, latitude, longitude, artist_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&artwork.title)
        .bind(&artwork.description)
        .bind(&artwork.image_url)
        .bind(artwork.latitude)
        .bind(artwork.longitude)
        .bind(artwork.artist_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?
        .last_insert_rowid();

        link_categories(&mut tx, id, &artwork.category_ids).await?;
        let created = fetch_artwork(&mut *tx, id).await?;
        tx.commit().await.map_err(storage_err)?;

        created.ok_or(DomainError::NotFound("Artwork"))
    }

    async fn find(&self, id: i64) -> Result<Option<Artwork>> {
        fetch_artwork(&self.pool, id).await
    }

    async fn list(&self, filter: ArtworkFilter) -> Result<Vec<Artwork>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ARTWORK_SELECT);
        qb.push(" WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND a.status = ").push_bind(status.as_str());
        }
        if let Some(featured) = filter.featured {
            qb.push(" AND a.is_featured = ").push_bind(featured);
        }
        if let Some(artist_id) = filter.artist_id {
            qb.push(" AND a.artist_id = ").push_bind(artist_id);
        }
        if let Some(category_id) = filter.category_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM artwork_categories ac \
                 WHERE ac.artwork_id = a.id AND ac.category_id = ",
            )
            .push_bind(category_id)
            .push(")");
        }
        if let Some(user_id) = filter.discovered_by {
            qb.push(
                " AND EXISTS (SELECT 1 FROM discoveries d \
                 WHERE d.artwork_id = a.id AND d.user_id = ",
            )
            .push_bind(user_id)
            .push(")");
        }
        if let Some(user_id) = filter.liked_by {
            qb.push(" AND EXISTS (SELECT 1 FROM likes l WHERE l.artwork_id = a.id AND l.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
        qb.push(" ORDER BY a.created_at DESC, a.id DESC");
        if let Some(page) = filter.page {
            qb.push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.skip);
        }

        let rows = qb
            .build_query_as::<ArtworkRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        convert_all(rows)
    }

    async fn update(&self, id: i64, patch: ArtworkPatch) -> Result<Artwork> {
        let result = sqlx::query(
            "UPDATE artworks SET \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                image_url = COALESCE(?, image_url) \
             WHERE id = ?",
        )
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.image_url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("Artwork"));
        }
        fetch_artwork(&self.pool, id)
            .await?
            .ok_or(DomainError::NotFound("Artwork"))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM artworks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_categories(&self, id: i64, category_ids: Vec<i64>) -> Result<u64> {
        let mut conn = self.pool.acquire().await.map_err(storage_err)?;
        link_categories(&mut conn, id, &category_ids).await
    }
}
