//! Image encoding: `DynamicImage` → base64 JPEG wrapped in `ImageData`.
//!
//! Chat-completion APIs accept images as base64 data URIs embedded in the
//! JSON request body. Pages are encoded as JPEG at quality 100: text stays
//! crisp while the payload is several times smaller than a PNG of a
//! full-page scan.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// JPEG quality used for every page.
pub const JPEG_QUALITY: u8 = 100;

/// MIME type of every encoded page.
pub const MIME_TYPE: &str = "image/jpeg";

/// Encode a rasterised page as a base64 JPEG ready for the vision model.
///
/// JPEG has no alpha channel, so the bitmap is flattened to RGB first.
/// `detail: "auto"` leaves the tiling decision to the model.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&rgb)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes jpeg, {} bytes base64", buf.len(), b64.len());

    Ok(ImageData::new(b64, MIME_TYPE).with_detail("auto"))
}
