use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{PublicUser, Role};
use serde::Deserialize;
use services::{AccountChanges, Registration};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountBody {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterBody>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let user = state
        .users
        .register(Registration {
            email: body.email,
            username: body.username,
            password: body.password,
            role: body.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.users.list(pagination.page(100)).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<PublicUser>> {
    Ok(Json(PublicUser::from(&state.users.get(id).await?)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<AccountBody>,
) -> ApiResult<Json<PublicUser>> {
    let changes = AccountChanges {
        email: body.email,
        username: body.username,
        password: body.password,
    };
    let updated = state.users.update_account(&user, id, changes).await?;
    Ok(Json(PublicUser::from(&updated)))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.users.delete_self(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn become_artist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PublicUser>> {
    let updated = state.users.become_artist(&user).await?;
    Ok(Json(PublicUser::from(&updated)))
}
