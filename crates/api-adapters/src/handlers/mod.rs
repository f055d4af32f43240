pub mod admin;
pub mod artworks;
pub mod auth;
pub mod categories;
pub mod discoveries;
pub mod profiles;
pub mod social;
pub mod system;
pub mod users;

use serde::Serialize;

/// `{"message": "..."}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> axum::Json<Self> {
        axum::Json(Self { message })
    }
}
