//! Administrative use cases. Every entry point takes an [`Admin`] guard, and
//! every mutation is written together with its audit log entry.

use std::sync::Arc;

use domains::ports::{ModerationRepository, UserRepository};
use domains::{
    Admin, Artwork, ArtworkStatus, Comment, CommentStatus, ContentAction, DetailedStats,
    DomainError, ExportQuery, LogQuery, ModerationAction, ModerationLog, NewModerationLog, Page,
    Result, Role, Stats, User, UserExportRow, UserStatus,
};
use tracing::info;

/// What happened to a moderated piece of content.
#[derive(Debug, Clone, PartialEq)]
pub enum Moderated<T> {
    Updated(T),
    Deleted,
}

pub struct ModerationService {
    users: Arc<dyn UserRepository>,
    moderation: Arc<dyn ModerationRepository>,
}

impl ModerationService {
    pub fn new(users: Arc<dyn UserRepository>, moderation: Arc<dyn ModerationRepository>) -> Self {
        Self { users, moderation }
    }

    pub async fn list_users(&self, _admin: &Admin, page: Page) -> Result<Vec<User>> {
        self.users.list(page).await
    }

    pub async fn ban(&self, admin: &Admin, user_id: i64, reason: Option<String>) -> Result<User> {
        let target = self.target_user(user_id).await?;
        if target.role == Role::Admin {
            return Err(DomainError::validation("Cannot ban an admin user"));
        }
        let reason = reason.filter(|r| !r.trim().is_empty());
        let entry =
            NewModerationLog::new(admin.id, ModerationAction::BanUser, user_id).with_reason(reason.clone());
        let user = self
            .moderation
            .set_user_status(user_id, UserStatus::Banned, reason, entry)
            .await?;
        info!(admin_id = admin.id, user_id, "user banned");
        Ok(user)
    }

    pub async fn unban(&self, admin: &Admin, user_id: i64) -> Result<User> {
        self.target_user(user_id).await?;
        let entry = NewModerationLog::new(admin.id, ModerationAction::UnbanUser, user_id);
        let user = self
            .moderation
            .set_user_status(user_id, UserStatus::Active, None, entry)
            .await?;
        info!(admin_id = admin.id, user_id, "user unbanned");
        Ok(user)
    }

    /// `PUT /admin/users/{id}/status`; dispatches to [`ban`](Self::ban) or
    /// [`unban`](Self::unban).
    pub async fn set_status(
        &self,
        admin: &Admin,
        user_id: i64,
        status: UserStatus,
        reason: Option<String>,
    ) -> Result<User> {
        match status {
            UserStatus::Banned => self.ban(admin, user_id, reason).await,
            UserStatus::Active => self.unban(admin, user_id).await,
        }
    }

    pub async fn delete_user(&self, admin: &Admin, user_id: i64) -> Result<()> {
        let target = self.target_user(user_id).await?;
        if target.role == Role::Admin {
            return Err(DomainError::validation("Cannot delete an admin user"));
        }
        let entry = NewModerationLog::new(admin.id, ModerationAction::DeleteUser, user_id);
        if !self.moderation.delete_user(user_id, entry).await? {
            return Err(DomainError::NotFound("User"));
        }
        info!(admin_id = admin.id, user_id, "user deleted");
        Ok(())
    }

    pub async fn feature(&self, admin: &Admin, artwork_id: i64, featured: bool) -> Result<Artwork> {
        let action = if featured {
            ModerationAction::FeatureArtwork
        } else {
            ModerationAction::UnfeatureArtwork
        };
        let entry = NewModerationLog::new(admin.id, action, artwork_id);
        let artwork = self
            .moderation
            .set_artwork_featured(artwork_id, featured, entry)
            .await?;
        info!(admin_id = admin.id, artwork_id, %action, "artwork feature flag changed");
        Ok(artwork)
    }

    pub async fn moderate_artwork(
        &self,
        admin: &Admin,
        artwork_id: i64,
        action: ContentAction,
        reason: Option<String>,
    ) -> Result<Moderated<Artwork>> {
        let (log_action, status) = match action {
            ContentAction::Hide => (ModerationAction::HideArtwork, Some(ArtworkStatus::Hidden)),
            ContentAction::Restore => (ModerationAction::RestoreArtwork, Some(ArtworkStatus::Active)),
            ContentAction::Delete => (ModerationAction::DeleteArtwork, None),
        };
        let entry = NewModerationLog::new(admin.id, log_action, artwork_id).with_reason(reason.clone());
        let outcome = match status {
            Some(status) => {
                let reason = (status == ArtworkStatus::Hidden).then_some(reason).flatten();
                Moderated::Updated(
                    self.moderation
                        .set_artwork_status(artwork_id, status, reason, entry)
                        .await?,
                )
            }
            None => {
                if !self.moderation.delete_artwork(artwork_id, entry).await? {
                    return Err(DomainError::NotFound("Artwork"));
                }
                Moderated::Deleted
            }
        };
        info!(admin_id = admin.id, artwork_id, action = %log_action, "artwork moderated");
        Ok(outcome)
    }

    pub async fn moderate_comment(
        &self,
        admin: &Admin,
        comment_id: i64,
        action: ContentAction,
        reason: Option<String>,
    ) -> Result<Moderated<Comment>> {
        let (log_action, status) = match action {
            ContentAction::Hide => (ModerationAction::HideComment, Some(CommentStatus::Hidden)),
            ContentAction::Restore => (ModerationAction::RestoreComment, Some(CommentStatus::Active)),
            ContentAction::Delete => (ModerationAction::DeleteComment, None),
        };
        let entry = NewModerationLog::new(admin.id, log_action, comment_id).with_reason(reason.clone());
        let outcome = match status {
            Some(status) => {
                let reason = (status == CommentStatus::Hidden).then_some(reason).flatten();
                Moderated::Updated(
                    self.moderation
                        .set_comment_status(comment_id, status, reason, entry)
                        .await?,
                )
            }
            None => {
                if !self.moderation.delete_comment(comment_id, entry).await? {
                    return Err(DomainError::NotFound("Comment"));
                }
                Moderated::Deleted
            }
        };
        info!(admin_id = admin.id, comment_id, action = %log_action, "comment moderated");
        Ok(outcome)
    }

    pub async fn stats(&self, _admin: &Admin) -> Result<Stats> {
        Ok(self.moderation.stats().await?.summary())
    }

    pub async fn detailed_stats(&self, _admin: &Admin) -> Result<DetailedStats> {
        self.moderation.stats().await
    }

    pub async fn logs(&self, _admin: &Admin, page: Page) -> Result<Vec<ModerationLog>> {
        self.moderation
            .logs(LogQuery {
                page: Some(page),
                ..LogQuery::default()
            })
            .await
    }

    pub async fn search_logs(&self, _admin: &Admin, query: LogQuery) -> Result<Vec<ModerationLog>> {
        if let (Some(start), Some(end)) = (query.start, query.end) {
            if start > end {
                return Err(DomainError::validation("start_date must not be after end_date"));
            }
        }
        self.moderation.logs(query).await
    }

    pub async fn export_users(&self, admin: &Admin, query: ExportQuery) -> Result<Vec<UserExportRow>> {
        let rows = self.users.export(query).await?;
        info!(admin_id = admin.id, rows = rows.len(), "user export generated");
        Ok(rows)
    }

    async fn target_user(&self, id: i64) -> Result<User> {
        self.users
            .find(id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }
}
