use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use domains::geo::Coordinates;
use domains::{Artwork, Category, NearbyArtwork, UnlockReceipt};
use serde::Deserialize;
use services::{ArtworkDraft, ArtworkEdit};

use crate::error::{ApiError, ApiResult};
use crate::extract::{
    ApiJson, ApiPath, ApiQuery, ArtistUser, CurrentUser, MaybeUser, Pagination,
};
use crate::multipart::FormData;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Kilometres; the configured default applies when absent.
    pub radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UnlockBody {
    pub artwork_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

fn required_number(form: &FormData, name: &str) -> ApiResult<f64> {
    form.number(name)?
        .ok_or_else(|| ApiError::bad_request(format!("Field `{name}` is required")))
}

pub async fn create(
    State(state): State<AppState>,
    ArtistUser(artist): ArtistUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Artwork>)> {
    let mut form = FormData::read(multipart).await?;
    let image = form
        .file("image")
        .ok_or_else(|| ApiError::bad_request("Field `image` is required"))?;
    let draft = ArtworkDraft {
        title: form.text("title").unwrap_or_default(),
        description: form.text("description").unwrap_or_default(),
        latitude: required_number(&form, "latitude")?,
        longitude: required_number(&form, "longitude")?,
        category_id: form.number("category_id")?,
        image,
    };
    let artwork = state.artworks.create(&artist, draft).await?;
    Ok((StatusCode::CREATED, Json(artwork)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(state.artworks.list(pagination.page(100)).await?))
}

pub async fn featured(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(state.artworks.featured(pagination.page(10)).await?))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.categories.list().await?))
}

pub async fn nearby(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(query): ApiQuery<NearbyQuery>,
) -> ApiResult<Json<Vec<NearbyArtwork>>> {
    let origin = Coordinates::new(query.latitude, query.longitude);
    let hits = state
        .discovery
        .nearby(viewer.as_ref(), origin, query.radius)
        .await?;
    Ok(Json(hits))
}

pub async fn unlock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<UnlockBody>,
) -> ApiResult<Json<UnlockReceipt>> {
    let position = Coordinates::new(body.latitude, body.longitude);
    Ok(Json(
        state
            .discovery
            .unlock(&user, body.artwork_id, position)
            .await?,
    ))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Artwork>> {
    Ok(Json(state.artworks.get(&user, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    multipart: Multipart,
) -> ApiResult<Json<Artwork>> {
    let mut form = FormData::read(multipart).await?;
    let edit = ArtworkEdit {
        title: form.text("title"),
        description: form.text("description"),
        image: form.file("image"),
    };
    Ok(Json(state.artworks.update(&user, id, edit).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.artworks.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(category_ids): ApiJson<Vec<i64>>,
) -> ApiResult<Json<Artwork>> {
    Ok(Json(
        state
            .artworks
            .add_categories(&user, id, category_ids)
            .await?,
    ))
}
