//! Raw rows as sqlx decodes them, and their conversion into domain models.

use chrono::{DateTime, Utc};
use domains::{
    Artwork, Category, Comment, DomainError, ModerationLog, SocialLinks, User, UserExportRow,
};
use sqlx::FromRow;

pub(crate) const USER_COLUMNS: &str = "id, email, username, password_hash, role, status, \
     ban_reason, bio, website, location, profile_picture, social_links, created_at, updated_at";

pub(crate) const ARTWORK_SELECT: &str = "SELECT a.id, a.title, a.description, a.image_url, \
     a.latitude, a.longitude, a.status, a.is_featured, a.moderation_reason, a.artist_id, \
     a.created_at, \
     (SELECT json_group_array(c.name) FROM artwork_categories ac \
        JOIN categories c ON c.id = ac.category_id WHERE ac.artwork_id = a.id) AS categories \
     FROM artworks a";

pub(crate) const COMMENT_SELECT: &str = "SELECT c.id, c.text, c.user_id, u.username, \
     c.artwork_id, c.status, c.moderation_reason, c.created_at \
     FROM comments c JOIN users u ON u.id = c.user_id";

fn corrupt(what: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::Storage(anyhow::anyhow!("corrupt {what} row: {err}"))
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    status: String,
    ban_reason: Option<String>,
    bio: Option<String>,
    website: Option<String>,
    location: Option<String>,
    profile_picture: Option<String>,
    social_links: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let social_links: SocialLinks =
            serde_json::from_str(&row.social_links).map_err(|e| corrupt("user", e))?;
        Ok(User {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(|e| corrupt("user", e))?,
            status: row.status.parse().map_err(|e| corrupt("user", e))?,
            ban_reason: row.ban_reason,
            bio: row.bio,
            website: row.website,
            location: row.location,
            profile_picture: row.profile_picture,
            social_links,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ArtworkRow {
    id: i64,
    title: String,
    description: String,
    image_url: Option<String>,
    latitude: f64,
    longitude: f64,
    status: String,
    is_featured: bool,
    moderation_reason: Option<String>,
    artist_id: i64,
    created_at: DateTime<Utc>,
    /// JSON array of category names.
    categories: String,
}

impl TryFrom<ArtworkRow> for Artwork {
    type Error = DomainError;

    fn try_from(row: ArtworkRow) -> Result<Self, Self::Error> {
        let mut categories: Vec<String> =
            serde_json::from_str(&row.categories).map_err(|e| corrupt("artwork", e))?;
        categories.sort();
        Ok(Artwork {
            id: row.id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            latitude: row.latitude,
            longitude: row.longitude,
            status: row.status.parse().map_err(|e| corrupt("artwork", e))?,
            is_featured: row.is_featured,
            moderation_reason: row.moderation_reason,
            artist_id: row.artist_id,
            created_at: row.created_at,
            categories,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CategoryRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CommentRow {
    id: i64,
    text: String,
    user_id: i64,
    username: String,
    artwork_id: i64,
    status: String,
    moderation_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = DomainError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: row.id,
            text: row.text,
            user_id: row.user_id,
            username: row.username,
            artwork_id: row.artwork_id,
            status: row.status.parse().map_err(|e| corrupt("comment", e))?,
            moderation_reason: row.moderation_reason,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ModerationLogRow {
    id: i64,
    admin_id: i64,
    action: String,
    target_type: String,
    target_id: i64,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ModerationLogRow> for ModerationLog {
    type Error = DomainError;

    fn try_from(row: ModerationLogRow) -> Result<Self, Self::Error> {
        Ok(ModerationLog {
            id: row.id,
            admin_id: row.admin_id,
            action: row.action.parse().map_err(|e| corrupt("moderation log", e))?,
            target_type: row
                .target_type
                .parse()
                .map_err(|e| corrupt("moderation log", e))?,
            target_id: row.target_id,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ExportRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    status: String,
    artworks_count: i64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ExportRow> for UserExportRow {
    type Error = DomainError;

    fn try_from(row: ExportRow) -> Result<Self, Self::Error> {
        Ok(UserExportRow {
            id: row.id,
            username: row.username,
            email: row.email,
            role: row.role.parse().map_err(|e| corrupt("user", e))?,
            status: row.status.parse().map_err(|e| corrupt("user", e))?,
            artworks_count: row.artworks_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Converts every row, failing on the first corrupt one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> domains::Result<Vec<T>>
where
    T: TryFrom<R, Error = DomainError>,
{
    rows.into_iter().map(T::try_from).collect()
}
