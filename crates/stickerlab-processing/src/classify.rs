//! Media classification.
//!
//! Determines what an asset actually is by sniffing magic bytes, never by
//! trusting the declared MIME type or a file extension. For GIF containers
//! the block stream is walked to establish whether the asset is animated and
//! how many frames it holds.

use stickerlab_core::{MediaAsset, MediaProbe, TransformError};

use crate::gif;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_TAG: &[u8] = b"WEBP";

/// Identify the container by magic bytes.
fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if gif::has_signature(bytes) {
        Some("image/gif")
    } else if bytes.starts_with(PNG_MAGIC) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some("image/jpeg")
    } else if bytes.len() >= 12 && bytes.starts_with(RIFF_MAGIC) && &bytes[8..12] == WEBP_TAG {
        Some("image/webp")
    } else {
        None
    }
}

fn is_known_image_mime(mime: &str) -> bool {
    matches!(
        mime.to_ascii_lowercase().as_str(),
        "image/gif" | "image/png" | "image/jpeg" | "image/jpg" | "image/webp"
    )
}

/// Inspect an asset's bytes and report `{is_animated, frame_count, mime_type}`.
///
/// A declared MIME type that names a recognized format but contradicts the
/// sniffed container is rejected: a renamed payload must not slip through as
/// its claimed type. Only GIF containers can be animated; a single-frame GIF
/// is classified static.
pub fn classify(asset: &MediaAsset) -> Result<MediaProbe, TransformError> {
    let bytes = asset.bytes();
    let sniffed = sniff_mime(bytes).ok_or_else(|| {
        TransformError::MalformedAsset(format!(
            "unrecognized container (declared {})",
            asset.declared_mime()
        ))
    })?;

    let declared = asset.declared_mime();
    if is_known_image_mime(declared) && !declared.eq_ignore_ascii_case(sniffed)
        // image/jpg is a common alias
        && !(sniffed == "image/jpeg" && declared.eq_ignore_ascii_case("image/jpg"))
    {
        return Err(TransformError::MalformedAsset(format!(
            "declared {declared} but the bytes are {sniffed}"
        )));
    }

    if sniffed == "image/gif" {
        let frame_count = gif::frame_count(bytes)?;
        let probe = MediaProbe {
            is_animated: frame_count >= 2,
            frame_count,
            mime_type: sniffed.to_string(),
        };
        tracing::debug!(
            frames = probe.frame_count,
            animated = probe.is_animated,
            "classified gif asset"
        );
        return Ok(probe);
    }

    Ok(MediaProbe::single_frame(sniffed))
}
