use std::sync::Arc;

use domains::ports::HealthCheck;
use services::{
    ArtworkService, CategoryService, DiscoveryService, ModerationService, SocialService,
    UserService,
};

use crate::metrics::Metrics;

/// Everything a handler can reach. Cloned per request, so every field is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub artworks: Arc<ArtworkService>,
    pub discovery: Arc<DiscoveryService>,
    pub categories: Arc<CategoryService>,
    pub social: Arc<SocialService>,
    pub moderation: Arc<ModerationService>,
    pub health: Arc<dyn HealthCheck>,
    pub metrics: Arc<Metrics>,
}
