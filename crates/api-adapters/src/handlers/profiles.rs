use axum::extract::{Multipart, State};
use axum::Json;
use domains::{Artwork, SocialLinks, UserProfile};
use services::ProfileChanges;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, ApiQuery, CurrentUser, Pagination};
use crate::multipart::FormData;
use crate::state::AppState;

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}

/// Multipart; `social_links` arrives as a JSON object of strings.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> ApiResult<Json<UserProfile>> {
    let mut form = FormData::read(multipart).await?;
    let social_links = form
        .text("social_links")
        .map(|raw| {
            serde_json::from_str::<SocialLinks>(&raw).map_err(|_| {
                ApiError::bad_request("Field `social_links` must be a JSON object of strings")
            })
        })
        .transpose()?;
    let changes = ProfileChanges {
        bio: form.text("bio"),
        website: form.text("website"),
        location: form.text("location"),
        social_links,
        picture: form.file("profile_picture"),
    };
    let updated = state.users.update_profile(&user, changes).await?;
    Ok(Json(UserProfile::from(&updated)))
}

pub async fn by_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(UserProfile::from(
        &state.users.by_username(&username).await?,
    )))
}

pub async fn artworks(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(
        state
            .artworks
            .by_artist(&username, pagination.page(100))
            .await?,
    ))
}
