//! Embedding fetched image bytes as a self-contained `data:` locator.

use super::FetchedImage;
use crate::types::ImageLocator;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode `image` as a `data:<mime>;base64,<payload>` locator.
///
/// The declared content type wins when it names an image; otherwise the type is
/// sniffed from the leading bytes.
pub fn embed_as_data_uri(image: &FetchedImage) -> ImageLocator {
    let mime = image
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .filter(|ct| ct.starts_with("image/"))
        .or_else(|| sniff_mime(&image.bytes))
        .unwrap_or(FALLBACK_MIME);
    ImageLocator::new(format!("data:{};base64,{}", mime, STANDARD.encode(&image.bytes)))
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
