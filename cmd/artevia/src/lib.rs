//! # artevia
//!
//! Composition root. Picks the adapters, hands them to the services and
//! mounts the services on the HTTP router. `main` only adds process
//! concerns (logging, listener, signals).

pub mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{AppState, HttpSettings, Metrics};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use axum::Router;
use configs::Settings;
use services::{
    ArtworkService, CategoryService, DiscoveryService, ModerationService, SocialService,
    UnlockPolicy, UserService,
};
use sqlx::SqlitePool;
use storage_adapters::{
    LocalMediaStore, SqliteArtworkRepository, SqliteCategoryRepository,
    SqliteDiscoveryRepository, SqliteHealthCheck, SqliteModerationRepository,
    SqliteSocialRepository, SqliteUserRepository,
};
use tracing::info;

/// Wires every service over `pool`.
pub fn state(pool: SqlitePool, settings: &Settings) -> AppState {
    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let artworks = Arc::new(SqliteArtworkRepository::new(pool.clone()));
    let categories = Arc::new(SqliteCategoryRepository::new(pool.clone()));
    let discoveries = Arc::new(SqliteDiscoveryRepository::new(pool.clone()));
    let social = Arc::new(SqliteSocialRepository::new(pool.clone()));
    let moderation = Arc::new(SqliteModerationRepository::new(pool.clone()));
    let media = Arc::new(LocalMediaStore::new(
        &settings.media.upload_dir,
        &settings.media.url_prefix,
        settings.media.max_upload_bytes,
    ));
    let tokens = Arc::new(JwtTokenService::new(
        &settings.auth.jwt_secret,
        chrono::Duration::minutes(settings.auth.token_ttl_minutes),
    ));
    let policy = UnlockPolicy {
        default_radius_km: settings.discovery.default_radius_km,
        max_unlock_distance_km: settings.discovery.unlock_radius_km,
    };

    AppState {
        users: Arc::new(UserService::new(
            users.clone(),
            Arc::new(Argon2Hasher::new()),
            tokens,
            media.clone(),
        )),
        artworks: Arc::new(ArtworkService::new(
            artworks.clone(),
            categories.clone(),
            users.clone(),
            media,
        )),
        discovery: Arc::new(DiscoveryService::new(artworks.clone(), discoveries, policy)),
        categories: Arc::new(CategoryService::new(categories)),
        social: Arc::new(SocialService::new(artworks, social)),
        moderation: Arc::new(ModerationService::new(users, moderation)),
        health: Arc::new(SqliteHealthCheck::new(pool)),
        metrics: Arc::new(Metrics::new()),
    }
}

pub fn http_settings(settings: &Settings) -> HttpSettings {
    HttpSettings {
        upload_dir: settings.media.upload_dir.clone().into(),
        url_prefix: settings.media.url_prefix.clone(),
        max_upload_bytes: settings.media.max_upload_bytes,
        allowed_origins: settings.cors.allowed_origins.clone(),
    }
}

/// The full application over a migrated pool. Default categories are
/// inserted if missing.
pub async fn app(pool: SqlitePool, settings: &Settings) -> anyhow::Result<Router> {
    let state = state(pool, settings);
    let seeded = state
        .categories
        .seed_defaults()
        .await
        .context("seeding default categories")?;
    if seeded > 0 {
        info!(seeded, "default categories created");
    }
    Ok(api_adapters::router(state, &http_settings(settings)))
}
