//! Domain models, rules and port definitions for Artevia.
//!
//! This crate has no I/O. Adapters implement [`ports`]; services combine
//! them.

pub mod access;
pub mod error;
pub mod geo;
pub mod models;
pub mod ports;

pub use access::{Admin, Artist, Capability};
pub use error::{DomainError, Result};
pub use models::*;
