use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{Artwork, Comment};
use serde::Deserialize;

use super::Message;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub text: String,
}

pub async fn like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(artwork_id): ApiPath<i64>,
) -> ApiResult<Json<Message>> {
    let message = if state.social.like(&user, artwork_id).await? {
        "Artwork liked successfully"
    } else {
        "Already liked"
    };
    Ok(Message::new(message))
}

pub async fn unlike(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(artwork_id): ApiPath<i64>,
) -> ApiResult<Json<Message>> {
    state.social.unlike(&user, artwork_id).await?;
    Ok(Message::new("Artwork unliked"))
}

pub async fn comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(artwork_id): ApiPath<i64>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state.social.comment(&user, artwork_id, &body.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn comments(
    State(state): State<AppState>,
    ApiPath(artwork_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.social.comments(artwork_id).await?))
}

pub async fn liked(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(state.artworks.liked_by(&user).await?))
}
