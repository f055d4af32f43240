use axum::extract::State;
use axum::Json;
use domains::geo::Coordinates;
use domains::{Artwork, UnlockReceipt};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Same gate as `POST /artworks/unlock`, with the position in the query.
pub async fn discover(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(artwork_id): ApiPath<i64>,
    ApiQuery(position): ApiQuery<Position>,
) -> ApiResult<Json<UnlockReceipt>> {
    let position = Coordinates::new(position.latitude, position.longitude);
    Ok(Json(
        state.discovery.unlock(&user, artwork_id, position).await?,
    ))
}

pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(state.artworks.discovered_by(&user).await?))
}
