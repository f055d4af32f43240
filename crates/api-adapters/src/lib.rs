//! # api-adapters
//!
//! The REST surface of Artevia. With `web-axum` (the default) this crate
//! exposes [`router`], which wires every route onto the services held in
//! [`AppState`].
//!
//! Errors leave as `{"detail": ...}` JSON with the status decided by
//! [`ApiError`].

#[cfg(feature = "web-axum")]
mod error;
#[cfg(feature = "web-axum")]
mod extract;
#[cfg(feature = "web-axum")]
mod handlers;
#[cfg(feature = "web-axum")]
pub mod metrics;
#[cfg(feature = "web-axum")]
mod multipart;
#[cfg(feature = "web-axum")]
mod router;
#[cfg(feature = "web-axum")]
mod state;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use metrics::Metrics;
#[cfg(feature = "web-axum")]
pub use router::{router, HttpSettings};
#[cfg(feature = "web-axum")]
pub use state::AppState;
