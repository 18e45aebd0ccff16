//! Encoded still frames handed over by the capture side.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// MIME type assumed when the payload's format cannot be sniffed.
/// Camera captures are JPEG.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// A base64 image payload plus its MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime_type: String,
    payload: String,
}

impl EncodedImage {
    /// Encode raw image bytes, sniffing the MIME type from the magic bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(AnalysisError::EmptyImage);
        }

        let mime_type = match ::image::guess_format(bytes) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(e) => {
                debug!(error = %e, fallback = DEFAULT_MIME_TYPE, "Could not sniff image format");
                DEFAULT_MIME_TYPE.to_string()
            }
        };

        Ok(Self {
            mime_type,
            payload: BASE64.encode(bytes),
        })
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| AnalysisError::InvalidImage("missing data: scheme".into()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AnalysisError::InvalidImage("missing ',' separator".into()))?;

        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            AnalysisError::InvalidImage("only base64 data URIs are supported".into())
        })?;

        if payload.is_empty() {
            return Err(AnalysisError::EmptyImage);
        }

        BASE64
            .decode(payload)
            .map_err(|e| AnalysisError::InvalidImage(format!("invalid base64 payload: {e}")))?;

        let mime_type = if mime_type.is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            mime_type
        };

        Ok(Self {
            mime_type: mime_type.to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The base64 payload, without the data URI header.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Render as a data URI, the form the inference endpoint accepts.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.payload)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_empty_bytes_rejected() {
        assert!(matches!(
            EncodedImage::from_bytes(&[]),
            Err(AnalysisError::EmptyImage)
        ));
    }

    #[test]
    fn test_png_mime_sniffed() {
        let image = EncodedImage::from_bytes(PNG_MAGIC).unwrap();
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_unknown_format_falls_back_to_jpeg() {
        let image = EncodedImage::from_bytes(b"not really an image").unwrap();
        assert_eq!(image.mime_type(), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_data_uri_roundtrip() {
        let image = EncodedImage::from_bytes(PNG_MAGIC).unwrap();
        let uri = image.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(EncodedImage::from_data_uri(&uri).unwrap(), image);
    }

    #[test]
    fn test_data_uri_errors() {
        assert!(matches!(
            EncodedImage::from_data_uri("image/png;base64,AAAA"),
            Err(AnalysisError::InvalidImage(_))
        ));
        assert!(matches!(
            EncodedImage::from_data_uri("data:image/png,AAAA"),
            Err(AnalysisError::InvalidImage(_))
        ));
        assert!(matches!(
            EncodedImage::from_data_uri("data:image/jpeg;base64,"),
            Err(AnalysisError::EmptyImage)
        ));
        assert!(matches!(
            EncodedImage::from_data_uri("data:image/jpeg;base64,@@@"),
            Err(AnalysisError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_debug_hides_payload() {
        let image = EncodedImage::from_bytes(b"abcdef").unwrap();
        let debug = format!("{image:?}");
        assert!(debug.contains("payload_len"));
        assert!(!debug.contains(image.payload()));
    }
}
