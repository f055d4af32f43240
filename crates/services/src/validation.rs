//! Input checks shared by the services.

use domains::ports::Upload;
use domains::{DomainError, Result};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Content types accepted for artwork images and profile pictures.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

pub fn email(value: &str) -> Result<String> {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(value.to_lowercase())
        }
        _ => Err(DomainError::validation("Invalid email address")),
    }
}

pub fn username(value: &str) -> Result<String> {
    let value = value.trim();
    let valid_chars = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if (3..=32).contains(&value.len()) && valid_chars {
        Ok(value.to_string())
    } else {
        Err(DomainError::validation(
            "Username must be 3-32 characters of letters, digits, '_', '-' or '.'",
        ))
    }
}

pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Trims `value` and rejects it when nothing is left.
pub fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(DomainError::validation(format!("{field} must not be empty")))
    } else {
        Ok(value.to_string())
    }
}

pub fn coordinate(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::validation(format!("{field} must be a number")))
    }
}

pub fn image(upload: &Upload) -> Result<()> {
    if upload.data.is_empty() {
        return Err(DomainError::validation("Image is empty"));
    }
    let essence = upload.content_type.essence_str();
    if ALLOWED_IMAGE_TYPES.contains(&essence) {
        Ok(())
    } else {
        Err(DomainError::validation("Invalid image type"))
    }
}
