//! Preview images travel as `data:<mime>;base64,<payload>` URIs.

use base64::Engine;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_MAX_PREVIEW_BYTES: usize = 5 * 1024 * 1024;

const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub mime: String,
    pub data: Vec<u8>,
}

impl PreviewImage {
    /// Parses and size-checks a data URI.
    pub fn from_data_uri(raw: &str, max_bytes: usize) -> AppResult<Self> {
        let trimmed = raw.trim();
        let rest = trimmed
            .strip_prefix("data:")
            .ok_or_else(|| AppError::Validation("preview image must be a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AppError::Validation("preview data URI has no payload".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| AppError::Validation("preview data URI must be base64 encoded".to_string()))?
            .to_ascii_lowercase();
        if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(AppError::Validation(format!("Unsupported preview image type: {}", mime)));
        }

        // Decoded size is at most 3/4 of the encoded length.
        if payload.len() / 4 * 3 > max_bytes + 3 {
            return Err(AppError::Validation(format!(
                "preview image exceeds {} bytes",
                max_bytes
            )));
        }
        let data = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|error| AppError::Validation(format!("Invalid preview base64 payload: {}", error)))?;
        if data.is_empty() {
            return Err(AppError::Validation("preview image is empty".to_string()));
        }
        if data.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "preview image exceeds {} bytes",
                max_bytes
            )));
        }
        Ok(Self { mime, data })
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::PreviewImage;
    use crate::errors::AppError;

    #[test]
    fn parses_png_data_uri() {
        let image = PreviewImage::from_data_uri("data:image/png;base64,iVBORw0KGgo=", 1024).expect("parse");
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.data, b"\x89PNG\r\n\x1a\n");
        assert_eq!(image.to_data_uri(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn rejects_unsupported_or_malformed_input() {
        for raw in [
            "iVBORw0KGgo=",
            "data:image/png,plain",
            "data:text/html;base64,PGI+",
            "data:image/png;base64,@@@",
            "data:image/png;base64,",
        ] {
            assert!(
                matches!(PreviewImage::from_data_uri(raw, 1024), Err(AppError::Validation(_))),
                "accepted {}",
                raw
            );
        }
    }

    #[test]
    fn enforces_size_limit() {
        let raw = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";
        assert!(PreviewImage::from_data_uri(raw, 1024).is_ok());
        assert!(matches!(PreviewImage::from_data_uri(raw, 8), Err(AppError::Validation(_))));
    }
}
