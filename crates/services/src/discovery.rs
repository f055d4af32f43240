//! Proximity search and the unlock gate.

use std::collections::HashSet;
use std::sync::Arc;

use domains::geo::{round_km, Coordinates};
use domains::ports::{ArtworkRepository, DiscoveryRepository};
use domains::{
    Artwork, ArtworkFilter, Capability, DomainError, NearbyArtwork, Result, UnlockReceipt,
    UnlockStatus, User,
};
use tracing::{info, warn};

use crate::validation;

/// Distances in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnlockPolicy {
    pub default_radius_km: f64,
    pub max_unlock_distance_km: f64,
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self {
            default_radius_km: 5.0,
            max_unlock_distance_km: 1.0,
        }
    }
}

pub struct DiscoveryService {
    artworks: Arc<dyn ArtworkRepository>,
    discoveries: Arc<dyn DiscoveryRepository>,
    policy: UnlockPolicy,
}

impl DiscoveryService {
    pub fn new(
        artworks: Arc<dyn ArtworkRepository>,
        discoveries: Arc<dyn DiscoveryRepository>,
        policy: UnlockPolicy,
    ) -> Self {
        Self {
            artworks,
            discoveries,
            policy,
        }
    }

    pub fn policy(&self) -> UnlockPolicy {
        self.policy
    }

    /// Active artworks within `radius_km` of `origin`, nearest first.
    ///
    /// Scans every active artwork. A non-positive or NaN radius matches
    /// nothing. Anonymous callers see `is_unlocked == false` throughout.
    pub async fn nearby(
        &self,
        viewer: Option<&User>,
        origin: Coordinates,
        radius_km: Option<f64>,
    ) -> Result<Vec<NearbyArtwork>> {
        let radius = radius_km.unwrap_or(self.policy.default_radius_km);
        if radius.is_nan() || radius <= 0.0 {
            return Ok(Vec::new());
        }

        let unlocked = match viewer {
            Some(user) => self.discoveries.unlocked_artwork_ids(user.id).await?,
            None => HashSet::new(),
        };

        let candidates = self.artworks.list(ArtworkFilter::active()).await?;
        Ok(within_radius(candidates, origin, radius, &unlocked))
    }

    /// Records that `user` found `artwork_id` while standing at `position`.
    ///
    /// Repeating a successful unlock is not an error: it reports
    /// `already_unlocked` with the original timestamp. A non-finite
    /// position is a validation error.
    pub async fn unlock(
        &self,
        user: &User,
        artwork_id: i64,
        position: Coordinates,
    ) -> Result<UnlockReceipt> {
        user.ensure(Capability::Participate)?;
        validation::coordinate("Latitude", position.latitude)?;
        validation::coordinate("Longitude", position.longitude)?;
        let artwork = self
            .artworks
            .find(artwork_id)
            .await?
            .filter(Artwork::is_active)
            .ok_or(DomainError::NotFound("Artwork"))?;

        let distance = position.distance_km(&artwork.coordinates());
        if distance.is_nan() || distance > self.policy.max_unlock_distance_km {
            warn!(
                user_id = user.id,
                artwork_id,
                distance_km = distance,
                "unlock rejected, too far"
            );
            return Err(DomainError::TooFar {
                distance_km: round_km(distance),
                max_km: self.policy.max_unlock_distance_km,
            });
        }

        let outcome = self.discoveries.record(user.id, artwork_id).await?;
        let (status, message) = if outcome.created {
            info!(user_id = user.id, artwork_id, "artwork unlocked");
            (UnlockStatus::Unlocked, "Artwork unlocked successfully")
        } else {
            (UnlockStatus::AlreadyUnlocked, "Artwork already unlocked")
        };
        Ok(UnlockReceipt {
            status,
            message: message.to_string(),
            artwork_id,
            distance: round_km(distance),
            discovered_at: outcome.discovery.discovered_at,
        })
    }
}

fn within_radius(
    candidates: Vec<Artwork>,
    origin: Coordinates,
    radius_km: f64,
    unlocked: &HashSet<i64>,
) -> Vec<NearbyArtwork> {
    let mut hits: Vec<(f64, NearbyArtwork)> = candidates
        .into_iter()
        .filter_map(|artwork| {
            let distance = origin.distance_km(&artwork.coordinates());
            (distance <= radius_km).then(|| {
                let is_unlocked = unlocked.contains(&artwork.id);
                (
                    distance,
                    NearbyArtwork {
                        artwork,
                        distance: round_km(distance),
                        is_unlocked,
                    },
                )
            })
        })
        .collect();
    hits.sort_by(|(a, x), (b, y)| a.total_cmp(b).then(x.artwork.id.cmp(&y.artwork.id)));
    hits.into_iter().map(|(_, hit)| hit).collect()
}
