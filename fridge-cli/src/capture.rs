//! Reads a still image from disk for the scan command.

use std::path::Path;

use anyhow::{Context, Result};
use fridge_core::EncodedImage;
use tracing::info;

/// Load `path` as an encoded image.
///
/// Raw image files are base64-encoded here. A file whose content starts
/// with `data:` is taken as a data URI, which is how browser captures are
/// usually saved.
pub fn load_image(path: &Path) -> Result<EncodedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;

    info!(path = %path.display(), bytes = bytes.len(), "Read image");

    let image = if bytes.starts_with(b"data:") {
        let uri = std::str::from_utf8(&bytes)
            .with_context(|| format!("Data URI in {} is not UTF-8", path.display()))?;
        EncodedImage::from_data_uri(uri)?
    } else {
        EncodedImage::from_bytes(&bytes)?
    };

    Ok(image)
}
