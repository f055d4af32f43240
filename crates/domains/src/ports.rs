//! # Ports
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Repositories own persistence; the remaining traits cover media storage,
//! password hashing and token issuance.

use std::collections::HashSet;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::*;

/// Account persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email or username is taken.
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list(&self, page: Page) -> Result<Vec<User>>;
    async fn update_account(&self, id: i64, update: AccountUpdate) -> Result<User>;
    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<User>;
    async fn set_role(&self, id: i64, role: Role) -> Result<User>;
    /// Returns `false` when no such user existed.
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn export(&self, query: ExportQuery) -> Result<Vec<UserExportRow>>;
}

/// Artwork persistence, including category links.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ArtworkRepository: Send + Sync {
    async fn create(&self, artwork: NewArtwork) -> Result<Artwork>;
    async fn find(&self, id: i64) -> Result<Option<Artwork>>;
    /// Newest first.
    async fn list(&self, filter: ArtworkFilter) -> Result<Vec<Artwork>>;
    async fn update(&self, id: i64, patch: ArtworkPatch) -> Result<Artwork>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Links existing categories; unknown ids and existing links are skipped.
    /// Returns how many links were added.
    async fn add_categories(&self, id: i64, category_ids: Vec<i64>) -> Result<u64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Ordered by name.
    async fn list(&self) -> Result<Vec<Category>>;
    async fn find(&self, id: i64) -> Result<Option<Category>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn create(&self, category: NewCategory) -> Result<Category>;
    async fn update(&self, id: i64, category: NewCategory) -> Result<Category>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Inserts whichever of `categories` are missing by name.
    async fn ensure(&self, categories: Vec<NewCategory>) -> Result<u64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DiscoveryRepository: Send + Sync {
    /// Conflict-ignoring insert: a second call for the same pair returns the
    /// original row with `created == false`.
    async fn record(&self, user_id: i64, artwork_id: i64) -> Result<DiscoveryOutcome>;
    async fn unlocked_artwork_ids(&self, user_id: i64) -> Result<HashSet<i64>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SocialRepository: Send + Sync {
    /// Returns `false` when the like already existed.
    async fn like(&self, user_id: i64, artwork_id: i64) -> Result<bool>;
    /// Returns `false` when there was nothing to remove.
    async fn unlike(&self, user_id: i64, artwork_id: i64) -> Result<bool>;
    async fn add_comment(&self, comment: NewComment) -> Result<Comment>;
    /// Oldest first. `status == None` returns every comment.
    async fn comments(
        &self,
        artwork_id: i64,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>>;
    async fn find_comment(&self, id: i64) -> Result<Option<Comment>>;
}

/// Administrative mutations. Each one writes its audit entry in the same
/// transaction as the change itself.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ModerationRepository: Send + Sync {
    async fn set_user_status(
        &self,
        user_id: i64,
        status: UserStatus,
        ban_reason: Option<String>,
        entry: NewModerationLog,
    ) -> Result<User>;
    async fn delete_user(&self, user_id: i64, entry: NewModerationLog) -> Result<bool>;
    async fn set_artwork_featured(
        &self,
        artwork_id: i64,
        featured: bool,
        entry: NewModerationLog,
    ) -> Result<Artwork>;
    async fn set_artwork_status(
        &self,
        artwork_id: i64,
        status: ArtworkStatus,
        reason: Option<String>,
        entry: NewModerationLog,
    ) -> Result<Artwork>;
    async fn delete_artwork(&self, artwork_id: i64, entry: NewModerationLog) -> Result<bool>;
    async fn set_comment_status(
        &self,
        comment_id: i64,
        status: CommentStatus,
        reason: Option<String>,
        entry: NewModerationLog,
    ) -> Result<Comment>;
    async fn delete_comment(&self, comment_id: i64, entry: NewModerationLog) -> Result<bool>;
    /// Newest first.
    async fn logs(&self, query: LogQuery) -> Result<Vec<ModerationLog>>;
    async fn stats(&self) -> Result<DetailedStats>;
}

/// Raw bytes of an uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub data: Bytes,
    pub content_type: mime::Mime,
    pub file_name: Option<String>,
}

/// Media storage contract for artwork images and profile pictures.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persists a validated image and returns its public URL.
    async fn save_image(&self, upload: Upload) -> Result<String>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Claims carried by an access token. The stored account stays authoritative;
/// `role` is informational.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl TokenClaims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> Result<AccessToken>;
    /// Fails with `Unauthorized` for malformed, forged or expired tokens.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<()>;
}
