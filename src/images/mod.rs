//! Image payload validation
//!
//! Uploaded images are checked for an accepted format and the size ceiling
//! before any request is constructed for the model.

pub mod unsplash;

pub use unsplash::UnsplashClient;

use crate::error::{AppError, AppResult};

/// Maximum accepted image payload (decoded bytes)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted image content types
pub const ACCEPTED_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Check a declared content type against the allow-list
pub fn validate_content_type(content_type: &str) -> AppResult<()> {
    if ACCEPTED_MIME_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(AppError::UnsupportedMediaType(format!(
            "Unsupported file type '{}'. Please upload a JPEG, PNG, or WebP image.",
            content_type
        )))
    }
}

/// Check the payload against the size ceiling
pub fn validate_size(len: usize) -> AppResult<()> {
    if len > MAX_IMAGE_BYTES {
        let size_mb = len as f64 / (1024.0 * 1024.0);
        return Err(AppError::PayloadTooLarge(format!(
            "Image too large ({:.1}MB). Please upload an image smaller than 10MB.",
            size_mb
        )));
    }
    Ok(())
}

/// Sniff the image format from magic bytes.
///
/// Used for base64 payloads that arrive without a declared content type.
pub fn sniff_mime_type(bytes: &[u8]) -> AppResult<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok("image/jpeg");
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok("image/png");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Ok("image/webp");
    }
    Err(AppError::UnsupportedMediaType(
        "Image data is not a JPEG, PNG, or WebP image.".to_string(),
    ))
}

/// Validate a complete image payload: size ceiling first, then format
pub fn validate_image_bytes(bytes: &[u8]) -> AppResult<&'static str> {
    validate_size(bytes.len())?;
    sniff_mime_type(bytes)
}
