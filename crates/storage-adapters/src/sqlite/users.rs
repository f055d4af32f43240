use async_trait::async_trait;
use chrono::Utc;
use domains::ports::UserRepository;
use domains::{
    AccountUpdate, DomainError, ExportQuery, ExportSort, NewUser, Page, ProfileUpdate, Result,
    Role, SortOrder, User, UserExportRow,
};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use super::rows::{convert_all, ExportRow, UserRow, USER_COLUMNS};
use super::{storage_err, unique_or_storage};

const TAKEN: &str = "Email or username already registered";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(crate) async fn fetch_user<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<User>> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(storage_err)?
        .map(User::try_from)
        .transpose()
}

async fn fetch_user_by(pool: &SqlitePool, column: &str, value: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE {column} = ?"
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .map_err(storage_err)?
    .map(User::try_from)
    .transpose()
}

/// Escapes LIKE wildcards so `term` matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let id = sqlx::query(
            "INSERT INTO users (email, username, password_hash, role, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(unique_or_storage(TAKEN))?
        .last_insert_rowid();

        fetch_user(&self.pool, id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    async fn find(&self, id: i64) -> Result<Option<User>> {
        fetch_user(&self.pool, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        fetch_user_by(&self.pool, "email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        fetch_user_by(&self.pool, "username", username).await
    }

    async fn list(&self, page: Page) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        convert_all(rows)
    }

    async fn update_account(&self, id: i64, update: AccountUpdate) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users SET \
                email = COALESCE(?, email), \
                username = COALESCE(?, username), \
                password_hash = COALESCE(?, password_hash), \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(update.email)
        .bind(update.username)
        .bind(update.password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(unique_or_storage(TAKEN))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("User"));
        }
        fetch_user(&self.pool, id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User> {
        let social_links = update
            .social_links
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(DomainError::internal)?;
        let result = sqlx::query(
            "UPDATE users SET \
                bio = COALESCE(?, bio), \
                website = COALESCE(?, website), \
                location = COALESCE(?, location), \
                profile_picture = COALESCE(?, profile_picture), \
                social_links = COALESCE(?, social_links), \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(update.bio)
        .bind(update.website)
        .bind(update.location)
        .bind(update.profile_picture)
        .bind(social_links)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("User"));
        }
        fetch_user(&self.pool, id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<User> {
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        fetch_user(&self.pool, id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn export(&self, query: ExportQuery) -> Result<Vec<UserExportRow>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT u.id, u.username, u.email, u.role, u.status, u.created_at, u.updated_at, \
             (SELECT COUNT(*) FROM artworks a WHERE a.artist_id = u.id) AS artworks_count \
             FROM users u",
        );
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            qb.push(" WHERE lower(u.username) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR lower(u.email) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\'");
        }
        let column = match query.sort {
            ExportSort::Id => "u.id",
            ExportSort::Username => "u.username",
            ExportSort::Email => "u.email",
            ExportSort::Status => "u.status",
            ExportSort::CreatedAt => "u.created_at",
        };
        let direction = match query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        qb.push(format!(" ORDER BY {column} {direction}, u.id {direction}"));

        let rows = qb
            .build_query_as::<ExportRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        convert_all(rows)
    }
}
