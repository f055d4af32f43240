//! # DomainError
//!
//! Centralized error handling for the Artevia crates.
//! Every port and service returns this type; the HTTP adapter maps each
//! variant to a status code.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (e.g., Artwork, Category, Comment)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Validation failure (e.g., empty title, bad image type)
    #[error("{0}")]
    Validation(String),

    /// Resource already exists (e.g., duplicate category name)
    #[error("{0}")]
    Conflict(String),

    /// Missing or bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (wrong role, banned, not the owner)
    #[error("{0}")]
    Forbidden(String),

    /// Unlock attempted from outside the unlock radius.
    #[error("You are {distance_km} km away; artworks unlock within {max_km} km")]
    TooFar { distance_km: f64, max_km: f64 },

    /// Datastore failure (e.g., pool exhausted, constraint we did not expect)
    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),

    /// Any other infrastructure failure (hashing, token signing, file I/O)
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// A specialized Result type for Artevia logic.
pub type Result<T> = std::result::Result<T, DomainError>;
