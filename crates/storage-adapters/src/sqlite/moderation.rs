//! Administrative writes. Each method applies its change and appends the
//! audit entry inside one transaction; an early return drops the transaction,
//! which rolls it back.

use async_trait::async_trait;
use chrono::Utc;
use domains::ports::ModerationRepository;
use domains::{
    Artwork, ArtworkStatus, Comment, CommentStatus, ContentStats, DetailedStats, DomainError,
    EngagementStats, LogQuery, ModerationLog, NewModerationLog, Result, User, UserStats,
    UserStatus,
};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::artworks::fetch_artwork;
use super::rows::{convert_all, ModerationLogRow};
use super::social::fetch_comment;
use super::storage_err;
use super::users::fetch_user;

pub struct SqliteModerationRepository {
    pool: SqlitePool,
}

impl SqliteModerationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn append_log(conn: &mut SqliteConnection, entry: &NewModerationLog) -> Result<()> {
    sqlx::query(
        "INSERT INTO moderation_logs (admin_id, action, target_type, target_id, reason, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.admin_id)
    .bind(entry.action.as_str())
    .bind(entry.target_type().as_str())
    .bind(entry.target_id)
    .bind(&entry.reason)
    .bind(Utc::now())
    .execute(conn)
    .await
    .map_err(storage_err)?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct StatsRow {
    users_total: i64,
    users_active: i64,
    users_banned: i64,
    users_artists: i64,
    artworks_total: i64,
    artworks_hidden: i64,
    comments_total: i64,
    comments_hidden: i64,
    likes_total: i64,
    discoveries_total: i64,
}

#[async_trait]
impl ModerationRepository for SqliteModerationRepository {
    async fn set_user_status(
        &self,
        user_id: i64,
        status: UserStatus,
        ban_reason: Option<String>,
        entry: NewModerationLog,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let updated = sqlx::query(
            "UPDATE users SET status = ?, ban_reason = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(ban_reason)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?
        .rows_affected();
        if updated == 0 {
            return Err(DomainError::NotFound("User"));
        }
        append_log(&mut tx, &entry).await?;
        let user = fetch_user(&mut *tx, user_id)
            .await?
            .ok_or(DomainError::NotFound("User"))?;
        tx.commit().await.map_err(storage_err)?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64, entry: NewModerationLog) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();
        if deleted == 0 {
            return Ok(false);
        }
        append_log(&mut tx, &entry).await?;
        tx.commit().await.map_err(storage_err)?;
        Ok(true)
    }

    async fn set_artwork_featured(
        &self,
        artwork_id: i64,
        featured: bool,
        entry: NewModerationLog,
    ) -> Result<Artwork> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let updated = sqlx::query("UPDATE artworks SET is_featured = ? WHERE id = ?")
            .bind(featured)
            .bind(artwork_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();
        if updated == 0 {
            return Err(DomainError::NotFound("Artwork"));
        }
        append_log(&mut tx, &entry).await?;
        let artwork = fetch_artwork(&mut *tx, artwork_id)
            .await?
            .ok_or(DomainError::NotFound("Artwork"))?;
        tx.commit().await.map_err(storage_err)?;
        Ok(artwork)
    }

    async fn set_artwork_status(
        &self,
        artwork_id: i64,
        status: ArtworkStatus,
        reason: Option<String>,
        entry: NewModerationLog,
    ) -> Result<Artwork> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let updated =
            sqlx::query("UPDATE artworks SET status = ?, moderation_reason = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(reason)
                .bind(artwork_id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?
                .rows_affected();
        if updated == 0 {
            return Err(DomainError::NotFound("Artwork"));
        }
        append_log(&mut tx, &entry).await?;
        let artwork = fetch_artwork(&mut *tx, artwork_id)
            .await?
            .ok_or(DomainError::NotFound("Artwork"))?;
        tx.commit().await.map_err(storage_err)?;
        Ok(artwork)
    }

    async fn delete_artwork(&self, artwork_id: i64, entry: NewModerationLog) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let deleted = sqlx::query("DELETE FROM artworks WHERE id = ?")
            .bind(artwork_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();
        if deleted == 0 {
            return Ok(false);
        }
        append_log(&mut tx, &entry).await?;
        tx.commit().await.map_err(storage_err)?;
        Ok(true)
    }

    async fn set_comment_status(
        &self,
        comment_id: i64,
        status: CommentStatus,
        reason: Option<String>,
        entry: NewModerationLog,
    ) -> Result<Comment> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let updated =
            sqlx::query("UPDATE comments SET status = ?, moderation_reason = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(reason)
                .bind(comment_id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?
                .rows_affected();
        if updated == 0 {
            return Err(DomainError::NotFound("Comment"));
        }
        append_log(&mut tx, &entry).await?;
        let comment = fetch_comment(&mut *tx, comment_id)
            .await?
            .ok_or(DomainError::NotFound("Comment"))?;
        tx.commit().await.map_err(storage_err)?;
        Ok(comment)
    }

    async fn delete_comment(&self, comment_id: i64, entry: NewModerationLog) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let deleted = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();
        if deleted == 0 {
            return Ok(false);
        }
        append_log(&mut tx, &entry).await?;
        tx.commit().await.map_err(storage_err)?;
        Ok(true)
    }

    async fn logs(&self, query: LogQuery) -> Result<Vec<ModerationLog>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, admin_id, action, target_type, target_id, reason, created_at \
             FROM moderation_logs WHERE 1 = 1",
        );
        if let Some(target_type) = query.target_type {
            qb.push(" AND target_type = ").push_bind(target_type.as_str());
        }
        if let Some(action) = query.action {
            qb.push(" AND action = ").push_bind(action.as_str());
        }
        if let Some(start) = query.start {
            qb.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = query.end {
            qb.push(" AND created_at <= ").push_bind(end);
        }
        qb.push(" ORDER BY created_at DESC, id DESC");
        if let Some(page) = query.page {
            qb.push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.skip);
        }

        let rows = qb
            .build_query_as::<ModerationLogRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        convert_all(rows)
    }

    async fn stats(&self) -> Result<DetailedStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS users_total, \
                (SELECT COUNT(*) FROM users WHERE status = 'active') AS users_active, \
                (SELECT COUNT(*) FROM users WHERE status = 'banned') AS users_banned, \
                (SELECT COUNT(*) FROM users WHERE role = 'artist') AS users_artists, \
                (SELECT COUNT(*) FROM artworks) AS artworks_total, \
                (SELECT COUNT(*) FROM artworks WHERE status = 'hidden') AS artworks_hidden, \
                (SELECT COUNT(*) FROM comments) AS comments_total, \
                (SELECT COUNT(*) FROM comments WHERE status = 'hidden') AS comments_hidden, \
                (SELECT COUNT(*) FROM likes) AS likes_total, \
                (SELECT COUNT(*) FROM discoveries) AS discoveries_total",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(DetailedStats {
            users: UserStats {
                total: row.users_total,
                active: row.users_active,
                banned: row.users_banned,
                artists: row.users_artists,
            },
            content: ContentStats {
                total_artworks: row.artworks_total,
                hidden_artworks: row.artworks_hidden,
                total_comments: row.comments_total,
                hidden_comments: row.comments_hidden,
            },
            engagement: EngagementStats {
                total_likes: row.likes_total,
                total_discoveries: row.discoveries_total,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::testing;
    use domains::{ModerationAction, TargetType};

    #[tokio::test]
    async fn ban_updates_status_and_logs_once() {
        let pool = testing::pool().await;
        let admin = testing::insert_user(&pool, "root", "admin").await;
        let target = testing::insert_user(&pool, "spammer", "user").await;
        let repo = SqliteModerationRepository::new(pool);

        let banned = repo
            .set_user_status(
                target,
                UserStatus::Banned,
                Some("spam".into()),
                NewModerationLog::new(admin, ModerationAction::BanUser, target)
                    .with_reason(Some("spam".into())),
            )
            .await
            .unwrap();
        assert_eq!(banned.status, UserStatus::Banned);
        assert_eq!(banned.ban_reason.as_deref(), Some("spam"));

        let logs = repo.logs(LogQuery::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, ModerationAction::BanUser);
        assert_eq!(logs[0].target_type, TargetType::User);
        assert_eq!(logs[0].target_id, target);
        assert_eq!(logs[0].admin_id, admin);
    }

    #[tokio::test]
    async fn missing_target_rolls_back_the_log_entry() {
        let pool = testing::pool().await;
        let admin = testing::insert_user(&pool, "root", "admin").await;
        let repo = SqliteModerationRepository::new(pool);

        let err = repo
            .set_artwork_status(
                404,
                ArtworkStatus::Hidden,
                None,
                NewModerationLog::new(admin, ModerationAction::HideArtwork, 404),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound("Artwork")));
        assert!(repo.logs(LogQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn logs_survive_deleting_their_target() {
        let pool = testing::pool().await;
        let admin = testing::insert_user(&pool, "root", "admin").await;
        let artist = testing::insert_user(&pool, "ada", "artist").await;
        let artwork = testing::insert_artwork(&pool, artist, 0.0, 0.0).await;
        let repo = SqliteModerationRepository::new(pool);

        assert!(repo
            .delete_artwork(
                artwork,
                NewModerationLog::new(admin, ModerationAction::DeleteArtwork, artwork),
            )
            .await
            .unwrap());
        assert!(repo
            .delete_user(
                artist,
                NewModerationLog::new(admin, ModerationAction::DeleteUser, artist),
            )
            .await
            .unwrap());

        let artwork_logs = repo
            .logs(LogQuery {
                target_type: Some(TargetType::Artwork),
                ..LogQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(artwork_logs.len(), 1);
        assert_eq!(repo.logs(LogQuery::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stats_count_every_table() {
        let pool = testing::pool().await;
        testing::insert_user(&pool, "root", "admin").await;
        let artist = testing::insert_user(&pool, "ada", "artist").await;
        testing::insert_artwork(&pool, artist, 0.0, 0.0).await;
        let repo = SqliteModerationRepository::new(pool);

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.users.total, 2);
        assert_eq!(stats.users.artists, 1);
        assert_eq!(stats.content.total_artworks, 1);
        assert_eq!(stats.engagement.total_likes, 0);
    }
}
