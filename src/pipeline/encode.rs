//! PNG payload helpers: base64 transport encoding and header inspection.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageReader;
use std::io::Cursor;
use tracing::debug;

/// MIME type of every rendered image.
pub const PNG_MIME_TYPE: &str = "image/png";

/// Base64-encode PNG bytes for an `image/png` content block.
pub fn encode_png(bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded image → {} bytes base64", b64.len());
    b64
}

/// Width and height from the PNG header, or `None` if the bytes are not a
/// decodable image.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
