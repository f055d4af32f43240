use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Page;
use crate::error::DomainError;
use crate::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtworkStatus {
    Active,
    Hidden,
}

impl ArtworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ArtworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtworkStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "hidden" => Ok(Self::Hidden),
            other => Err(DomainError::validation(format!(
                "unknown artwork status `{other}`"
            ))),
        }
    }
}

/// A geolocated piece of art owned by exactly one artist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artwork {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ArtworkStatus,
    pub is_featured: bool,
    pub moderation_reason: Option<String>,
    pub artist_id: i64,
    pub created_at: DateTime<Utc>,
    /// Category names, alphabetical.
    pub categories: Vec<String>,
}

impl Artwork {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn is_active(&self) -> bool {
        self.status == ArtworkStatus::Active
    }
}

#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub artist_id: i64,
    pub category_ids: Vec<i64>,
}

/// Owner edits. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ArtworkPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Listing criteria; every `Some` narrows the result.
#[derive(Debug, Clone, Default)]
pub struct ArtworkFilter {
    pub status: Option<ArtworkStatus>,
    pub featured: Option<bool>,
    pub artist_id: Option<i64>,
    pub category_id: Option<i64>,
    /// Restrict to artworks discovered by this user.
    pub discovered_by: Option<i64>,
    /// Restrict to artworks liked by this user.
    pub liked_by: Option<i64>,
    /// `None` returns every match.
    pub page: Option<Page>,
}

impl ArtworkFilter {
    pub fn active() -> Self {
        Self {
            status: Some(ArtworkStatus::Active),
            ..Self::default()
        }
    }

    pub fn paged(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }
}

/// One hit of the proximity filter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NearbyArtwork {
    #[serde(flatten)]
    pub artwork: Artwork,
    /// Kilometres from the requester, rounded to two decimals.
    pub distance: f64,
    pub is_unlocked: bool,
}
