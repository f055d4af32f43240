use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Page;
use crate::error::DomainError;

/// Every action an administrator can take, as recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    BanUser,
    UnbanUser,
    DeleteUser,
    FeatureArtwork,
    UnfeatureArtwork,
    HideArtwork,
    RestoreArtwork,
    DeleteArtwork,
    HideComment,
    RestoreComment,
    DeleteComment,
}

impl ModerationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BanUser => "ban_user",
            Self::UnbanUser => "unban_user",
            Self::DeleteUser => "delete_user",
            Self::FeatureArtwork => "feature_artwork",
            Self::UnfeatureArtwork => "unfeature_artwork",
            Self::HideArtwork => "hide_artwork",
            Self::RestoreArtwork => "restore_artwork",
            Self::DeleteArtwork => "delete_artwork",
            Self::HideComment => "hide_comment",
            Self::RestoreComment => "restore_comment",
            Self::DeleteComment => "delete_comment",
        }
    }

    pub fn target_type(self) -> TargetType {
        match self {
            Self::BanUser | Self::UnbanUser | Self::DeleteUser => TargetType::User,
            Self::FeatureArtwork
            | Self::UnfeatureArtwork
            | Self::HideArtwork
            | Self::RestoreArtwork
            | Self::DeleteArtwork => TargetType::Artwork,
            Self::HideComment | Self::RestoreComment | Self::DeleteComment => TargetType::Comment,
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::BanUser,
            Self::UnbanUser,
            Self::DeleteUser,
            Self::FeatureArtwork,
            Self::UnfeatureArtwork,
            Self::HideArtwork,
            Self::RestoreArtwork,
            Self::DeleteArtwork,
            Self::HideComment,
            Self::RestoreComment,
            Self::DeleteComment,
        ]
        .into_iter()
        .find(|action| action.as_str() == s)
        .ok_or_else(|| DomainError::validation(format!("unknown moderation action `{s}`")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    User,
    Artwork,
    Comment,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Artwork => "artwork",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "artwork" => Ok(Self::Artwork),
            "comment" => Ok(Self::Comment),
            other => Err(DomainError::validation(format!(
                "unknown target type `{other}`"
            ))),
        }
    }
}

/// The verb of a content moderation request (`hide`, `restore`, `delete`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentAction {
    Hide,
    Restore,
    Delete,
}

impl FromStr for ContentAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hide" => Ok(Self::Hide),
            "restore" => Ok(Self::Restore),
            "delete" => Ok(Self::Delete),
            _ => Err(DomainError::validation("Invalid action")),
        }
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModerationLog {
    pub id: i64,
    pub admin_id: i64,
    pub action: ModerationAction,
    pub target_type: TargetType,
    pub target_id: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewModerationLog {
    pub admin_id: i64,
    pub action: ModerationAction,
    pub target_id: i64,
    pub reason: Option<String>,
}

impl NewModerationLog {
    pub fn new(admin_id: i64, action: ModerationAction, target_id: i64) -> Self {
        Self {
            admin_id,
            action,
            target_id,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn target_type(&self) -> TargetType {
        self.action.target_type()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub target_type: Option<TargetType>,
    pub action: Option<ModerationAction>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: Option<Page>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Stats {
    pub total_users: i64,
    pub total_artists: i64,
    pub total_artworks: i64,
    pub total_likes: i64,
    pub total_comments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total: i64,
    pub active: i64,
    pub banned: i64,
    pub artists: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContentStats {
    pub total_artworks: i64,
    pub hidden_artworks: i64,
    pub total_comments: i64,
    pub hidden_comments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EngagementStats {
    pub total_likes: i64,
    pub total_discoveries: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DetailedStats {
    pub users: UserStats,
    pub content: ContentStats,
    pub engagement: EngagementStats,
}

impl DetailedStats {
    pub fn summary(&self) -> Stats {
        Stats {
            total_users: self.users.total,
            total_artists: self.users.artists,
            total_artworks: self.content.total_artworks,
            total_likes: self.engagement.total_likes,
            total_comments: self.content.total_comments,
        }
    }
}
