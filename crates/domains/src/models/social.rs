use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A user has found an artwork. At most one per (user, artwork).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discovery {
    pub id: i64,
    pub user_id: i64,
    pub artwork_id: i64,
    pub discovered_at: DateTime<Utc>,
}

/// Result of a conflict-ignoring discovery write.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOutcome {
    pub discovery: Discovery,
    /// `false` when the pair already existed.
    pub created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockStatus {
    Unlocked,
    AlreadyUnlocked,
}

/// What the caller gets back from a successful unlock attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnlockReceipt {
    pub status: UnlockStatus,
    pub message: String,
    pub artwork_id: i64,
    /// Kilometres from the artwork, rounded to two decimals.
    pub distance: f64,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub artwork_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Active,
    Hidden,
}

impl CommentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "hidden" => Ok(Self::Hidden),
            other => Err(DomainError::validation(format!(
                "unknown comment status `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    /// Author's username at read time.
    pub username: String,
    pub artwork_id: i64,
    pub status: CommentStatus,
    pub moderation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub user_id: i64,
    pub artwork_id: i64,
}
