use async_trait::async_trait;
use chrono::Utc;
use domains::ports::SocialRepository;
use domains::{Comment, CommentStatus, DomainError, NewComment, Result};
use sqlx::{SqliteExecutor, SqlitePool};

use super::rows::{convert_all, CommentRow, COMMENT_SELECT};
use super::storage_err;

pub struct SqliteSocialRepository {
    pool: SqlitePool,
}

impl SqliteSocialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(crate) async fn fetch_comment<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Comment>> {
    sqlx::query_as::<_, CommentRow>(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(storage_err)?
        .map(Comment::try_from)
        .transpose()
}

#[async_trait]
impl SocialRepository for SqliteSocialRepository {
    async fn like(&self, user_id: i64, artwork_id: i64) -> Result<bool> {
        let inserted = sqlx::query(
            "INSERT INTO likes (user_id, artwork_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, artwork_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(artwork_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?
        .rows_affected();
        Ok(inserted == 1)
    }

    async fn unlike(&self, user_id: i64, artwork_id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM likes WHERE user_id = ? AND artwork_id = ?")
            .bind(user_id)
            .bind(artwork_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        let id = sqlx::query(
            "INSERT INTO comments (text, user_id, artwork_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&comment.text)
        .bind(comment.user_id)
        .bind(comment.artwork_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?
        .last_insert_rowid();

        fetch_comment(&self.pool, id)
            .await?
            .ok_or(DomainError::NotFound("Comment"))
    }

    async fn comments(
        &self,
        artwork_id: i64,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.artwork_id = ? AND (? IS NULL OR c.status = ?) \
             ORDER BY c.created_at, c.id"
        ))
        .bind(artwork_id)
        .bind(status.map(CommentStatus::as_str))
        .bind(status.map(CommentStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        convert_all(rows)
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>> {
        fetch_comment(&self.pool, id).await
    }
}
