//! Representative-frame extraction for animated assets.
//!
//! Full per-frame re-synthesis would cost one generative call per frame, so
//! animated input is approximated by its first frame. The pipeline tags the
//! result so callers know the rest of the animation was dropped.

use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;

use stickerlab_core::{RasterImage, TransformError};

use crate::codec;

/// Decode the first frame of an animated GIF.
pub fn first_frame(bytes: &[u8]) -> Result<RasterImage, TransformError> {
    let decoder = GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| TransformError::AssetDecode(format!("gif decode failed: {e}")))?;

    let first = decoder
        .into_frames()
        .next()
        .ok_or_else(|| TransformError::MalformedAsset("gif contains no frames".into()))?
        .map_err(|e| TransformError::AssetDecode(format!("gif frame decode failed: {e}")))?;

    codec::rgba_to_raster(first.into_buffer())
}
