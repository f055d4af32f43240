use axum::extract::State;
use axum::Json;
use domains::ports::AccessToken;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::ApiForm;
use crate::state::AppState;

/// OAuth2 password-flow form; `username` carries the email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn token(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> ApiResult<Json<AccessToken>> {
    Ok(Json(state.users.login(&form.username, &form.password).await?))
}

pub async fn admin_login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> ApiResult<Json<AccessToken>> {
    Ok(Json(
        state
            .users
            .admin_login(&form.username, &form.password)
            .await?,
    ))
}
