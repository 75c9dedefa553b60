//! Inbound photo payload parsing and validation.
//!
//! Submissions arrive as a data URI (or bare base64) in a JSON body. The
//! payload is decoded and checked here, before the session layer reserves
//! an attempt slot or the verifier is invoked: an undecodable, oversized,
//! or non-image payload is an input error with no side effects.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;

use crate::error::CoreError;

/// Hard ceiling for one inbound photo. Enforced before the verifier call to
/// bound resource use.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Image formats the platform accepts from mobile browsers.
const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// A decoded, validated photo ready for storage and verification.
#[derive(Debug, Clone)]
pub struct PhotoPayload {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl PhotoPayload {
    /// Parse a `data:<mime>;base64,<payload>` URI or a bare base64 string.
    ///
    /// The declared MIME type is ignored; the format is sniffed from the
    /// decoded bytes because the client is untrusted.
    pub fn from_data_uri(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Photo payload is empty".into()));
        }

        let encoded = match trimmed.strip_prefix("data:") {
            Some(rest) => {
                let (_mime, payload) = rest.split_once(";base64,").ok_or_else(|| {
                    CoreError::Validation(
                        "Data URI must use base64 encoding (data:<mime>;base64,...)".into(),
                    )
                })?;
                payload
            }
            None => trimmed,
        };

        // A base64 ceiling check first, so a deliberately huge payload is
        // rejected without decoding it.
        if encoded.len() > MAX_PHOTO_BYTES / 3 * 4 + 4 {
            return Err(CoreError::Validation(format!(
                "Photo exceeds the {} MB limit",
                MAX_PHOTO_BYTES / (1024 * 1024)
            )));
        }

        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| CoreError::Validation(format!("Photo payload is not valid base64: {e}")))?;

        Self::from_bytes(bytes)
    }

    /// Validate already-decoded image bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Validation("Photo payload is empty".into()));
        }
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(CoreError::Validation(format!(
                "Photo exceeds the {} MB limit",
                MAX_PHOTO_BYTES / (1024 * 1024)
            )));
        }

        let format = image::guess_format(&bytes)
            .map_err(|_| CoreError::Validation("Payload is not a recognized image".into()))?;

        if !ACCEPTED_FORMATS.contains(&format) {
            return Err(CoreError::Validation(format!(
                "Unsupported image format {format:?}; use PNG, JPEG, or WebP"
            )));
        }

        Ok(Self { bytes, format })
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the payload, returning the raw bytes for storage.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Sniffed image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type matching the sniffed format.
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            _ => "image/webp",
        }
    }

    /// Re-encode as a data URI for the vision request.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            BASE64.encode(&self.bytes)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal valid 1x1 PNG.
    fn png_bytes() -> Vec<u8> {
        vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
            0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
            0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
            0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ]
    }

    fn png_data_uri() -> String {
        format!("data:image/png;base64,{}", BASE64.encode(png_bytes()))
    }

    #[test]
    fn parses_a_png_data_uri() {
        let photo = PhotoPayload::from_data_uri(&png_data_uri()).unwrap();
        assert_eq!(photo.format(), ImageFormat::Png);
        assert_eq!(photo.mime_type(), "image/png");
        assert_eq!(photo.bytes(), png_bytes().as_slice());
    }

    #[test]
    fn parses_bare_base64() {
        let encoded = BASE64.encode(png_bytes());
        let photo = PhotoPayload::from_data_uri(&encoded).unwrap();
        assert_eq!(photo.format(), ImageFormat::Png);
    }

    #[test]
    fn round_trips_through_data_uri() {
        let uri = png_data_uri();
        let photo = PhotoPayload::from_data_uri(&uri).unwrap();
        assert_eq!(photo.to_data_uri(), uri);
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(matches!(
            PhotoPayload::from_data_uri(""),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            PhotoPayload::from_bytes(Vec::new()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        assert!(matches!(
            PhotoPayload::from_data_uri("data:image/png;base64,!!!not-base64!!!"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_data_uri_without_base64_marker() {
        assert!(matches!(
            PhotoPayload::from_data_uri("data:image/png,rawbytes"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(matches!(
            PhotoPayload::from_bytes(b"just some text".to_vec()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_oversized_payload() {
        let mut bytes = png_bytes();
        bytes.resize(MAX_PHOTO_BYTES + 1, 0);
        assert!(matches!(
            PhotoPayload::from_bytes(bytes),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn rejects_oversized_data_uri_without_decoding() {
        // 14 MB of base64 'A's; must be rejected by the length pre-check.
        let huge = "A".repeat(14 * 1024 * 1024);
        assert!(matches!(
            PhotoPayload::from_data_uri(&huge),
            Err(CoreError::Validation(_))
        ));
    }
}
