//! # Domain Models
//!
//! These structs represent the core entities of Artevia.
//! Identifiers are the datastore's integer row ids.

mod artwork;
mod category;
mod moderation;
mod social;
mod user;

pub use artwork::*;
pub use category::*;
pub use moderation::*;
pub use social::*;
pub use user::*;

/// Ad hoc `skip`/`limit` pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 100;

    /// Clamps `skip` to be non-negative and `limit` into `1..=MAX_LIMIT`.
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::MAX_LIMIT)
    }
}
