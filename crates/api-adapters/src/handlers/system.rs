use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use tracing::warn;

use super::Message;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const OPENMETRICS: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub async fn root() -> Json<Message> {
    Message::new("Welcome to Artevia API")
}

/// 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.health.ping().await {
        Ok(()) => Json(json!({ "status": "ok", "database": "ok" })).into_response(),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable" })),
            )
                .into_response()
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<Response> {
    let body = state.metrics.render().map_err(DomainError::internal)?;
    Ok(([(header::CONTENT_TYPE, OPENMETRICS)], body).into_response())
}

pub async fn not_found() -> ApiError {
    ApiError::Domain(DomainError::NotFound("Route"))
}
