//! Use cases of the Artevia API, written against the `domains` ports.
//!
//! Services hold `Arc<dyn Port>` handles and are cheap to share between
//! requests. They never touch HTTP types; the api adapter maps
//! [`domains::DomainError`] to responses.

pub mod artworks;
pub mod categories;
pub mod discovery;
pub mod export;
pub mod moderation;
pub mod social;
pub mod users;
pub mod validation;

pub use artworks::{ArtworkDraft, ArtworkEdit, ArtworkService};
pub use categories::CategoryService;
pub use discovery::{DiscoveryService, UnlockPolicy};
pub use export::UsersCsv;
pub use moderation::ModerationService;
pub use social::SocialService;
pub use users::{AccountChanges, ProfileChanges, Registration, UserService};

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{TimeZone, Utc};
    use domains::{Artwork, ArtworkStatus, Role, User, UserStatus};

    pub fn user(id: i64, role: Role) -> User {
        User {
            id,
            email: format!("user{id}@example.org"),
            username: format!("user{id}"),
            password_hash: "hash".into(),
            role,
            status: UserStatus::Active,
            ban_reason: None,
            bio: None,
            website: None,
            location: None,
            profile_picture: None,
            social_links: Default::default(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    pub fn artwork(id: i64, artist_id: i64, latitude: f64, longitude: f64) -> Artwork {
        Artwork {
            id,
            title: format!("Artwork {id}"),
            description: "On a wall".into(),
            image_url: Some(format!("/uploads/{id}.png")),
            latitude,
            longitude,
            status: ArtworkStatus::Active,
            is_featured: false,
            moderation_reason: None,
            artist_id,
            created_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
            categories: vec!["Mural".into()],
        }
    }
}
