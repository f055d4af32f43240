//! # auth-adapters
//!
//! Argon2 password hashing and, behind `auth-jwt`, HS256 bearer tokens.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;
pub use password::Argon2Hasher;
