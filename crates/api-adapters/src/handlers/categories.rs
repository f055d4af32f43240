use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{Artwork, Category, NewCategory};

use crate::error::ApiResult;
use crate::extract::{AdminUser, ApiJson, ApiPath, ApiQuery, Pagination};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.categories.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(category): ApiJson<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let created = state.categories.create(&admin, category).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(category): ApiJson<NewCategory>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.categories.update(&admin, id, category).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.categories.delete(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn artworks(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(
        state
            .artworks
            .by_category(id, pagination.page(100))
            .await?,
    ))
}
