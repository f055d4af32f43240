//! HTTP mapping of [`DomainError`].

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request could not be parsed (bad JSON, query, path or form).
    #[error("{0}")]
    BadRequest(String),

    #[error("Not authenticated")]
    MissingToken,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_distance: Option<f64>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Domain(err) => match err {
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::Validation(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
                DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                DomainError::Forbidden(_) | DomainError::TooFar { .. } => StatusCode::FORBIDDEN,
                DomainError::Storage(_) | DomainError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn body(&self) -> ErrorBody {
        let detail = match self {
            Self::Domain(DomainError::Storage(err) | DomainError::Internal(err)) => {
                error!(error = format!("{err:#}"), "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let (distance, max_distance) = match self {
            Self::Domain(DomainError::TooFar {
                distance_km,
                max_km,
            }) => (Some(*distance_km), Some(*max_km)),
            _ => (None, None),
        };
        ErrorBody {
            detail,
            distance,
            max_distance,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(self.body())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

macro_rules! rejection_is_bad_request {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self::BadRequest(rejection.body_text())
                }
            }
        )+
    };
}

rejection_is_bad_request!(
    JsonRejection,
    QueryRejection,
    FormRejection,
    PathRejection,
    MultipartRejection,
    MultipartError,
);
