//! # Upload Validation
//!
//! Images arrive either as `data:` URLs (the HTTP API, mirroring what a
//! browser `FileReader` produces) or as raw file bytes (the CLI). Both paths
//! end in an [`ImageUpload`], which is the only thing the gateway client
//! accepts.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use thiserror::Error;

/// Largest accepted image, in decoded bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Upload rejection reasons.
///
/// `NotAnImage` and `TooLarge` carry the user-facing wording.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please upload an image file (JPG, PNG, etc.)")]
    NotAnImage { mime: String },

    #[error("Please upload an image smaller than 10MB")]
    TooLarge { size: usize, max: usize },

    #[error("The uploaded image is empty")]
    Empty,

    #[error("Malformed image data URL")]
    MalformedDataUrl,

    #[error("Image data is not valid base64")]
    InvalidBase64,
}

/// A validated image ready to forward upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    mime: String,
    size: usize,
    data_url: String,
}

impl ImageUpload {
    /// Validate a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(data_url: &str) -> Result<Self, UploadError> {
        let rest = data_url
            .trim()
            .strip_prefix("data:")
            .ok_or(UploadError::MalformedDataUrl)?;
        let (meta, payload) = rest.split_once(',').ok_or(UploadError::MalformedDataUrl)?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or(UploadError::MalformedDataUrl)?
            .to_ascii_lowercase();

        check_mime(&mime)?;

        // Reject by encoded length first so oversized payloads are never decoded.
        let approx = payload.len() / 4 * 3;
        if approx > MAX_IMAGE_BYTES + 3 {
            return Err(UploadError::TooLarge {
                size: approx,
                max: MAX_IMAGE_BYTES,
            });
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| UploadError::InvalidBase64)?;
        check_size(bytes.len())?;

        Ok(Self {
            data_url: format!("data:{mime};base64,{}", payload.trim()),
            mime,
            size: bytes.len(),
        })
    }

    /// Validate raw image bytes and build the data URL.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self, UploadError> {
        let mime = mime.trim().to_ascii_lowercase();
        check_mime(&mime)?;
        check_size(bytes.len())?;

        Ok(Self {
            data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            mime,
            size: bytes.len(),
        })
    }

    /// MIME type, lowercased.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Decoded size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The data URL forwarded to the gateway.
    #[must_use]
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

fn check_mime(mime: &str) -> Result<(), UploadError> {
    if mime.starts_with("image/") && mime.len() > "image/".len() {
        Ok(())
    } else {
        Err(UploadError::NotAnImage {
            mime: mime.to_string(),
        })
    }
}

fn check_size(size: usize) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Guess a MIME type from a file extension.
///
/// Unknown extensions map to `application/octet-stream`, which the image
/// check then rejects.
#[must_use]
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg" | "jfif") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("tif" | "tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// TESTS
// =============================================================================
