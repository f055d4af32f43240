//! # storage-adapters
//!
//! Persistence and media implementations of the `domains` ports.
//!
//! - `db-sqlite`: sqlx repositories over a shared `SqlitePool`, with
//!   embedded migrations.
//! - `media-local`: content-addressed image storage on the local filesystem.

#[cfg(feature = "media-local")]
pub mod media;
#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "media-local")]
pub use media::LocalMediaStore;
#[cfg(feature = "db-sqlite")]
pub use sqlite::{
    connect, connect_in_memory, migrate, SqliteArtworkRepository, SqliteCategoryRepository,
    SqliteDiscoveryRepository, SqliteHealthCheck, SqliteModerationRepository,
    SqliteSocialRepository, SqliteUserRepository,
};
