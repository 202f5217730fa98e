//! Raster codec: decode arbitrary image bytes into `RasterImage`, encode to
//! the canonical output format (RGBA PNG).
//!
//! The canonical encoding matters twice: the generative backend accepts only
//! a small fixed set of encodings, and the pipeline's terminal output is
//! always a PNG with alpha.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};

use stickerlab_core::{PixelFormat, RasterImage, TransformError};

/// Decode encoded image bytes into a raster, preserving whether the source
/// carried an alpha channel.
pub fn decode_raster(bytes: &[u8]) -> Result<RasterImage, TransformError> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TransformError::AssetDecode(e.to_string()))?;
    dynamic_to_raster(dyn_img)
}

pub fn dynamic_to_raster(img: DynamicImage) -> Result<RasterImage, TransformError> {
    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        RasterImage::new(width, height, PixelFormat::Rgba, rgba.into_raw())
    } else {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        RasterImage::new(width, height, PixelFormat::Rgb, rgb.into_raw())
    }
}

/// View a raster as an `RgbaImage`, expanding RGB sources with opaque alpha.
pub fn raster_to_rgba(raster: &RasterImage) -> RgbaImage {
    let (width, height) = (raster.width(), raster.height());
    match raster.format() {
        PixelFormat::Rgba => RgbaImage::from_raw(width, height, raster.data().to_vec())
            .unwrap_or_else(|| RgbaImage::new(width, height)),
        PixelFormat::Rgb => {
            let mut rgba = Vec::with_capacity(raster.data().len() / 3 * 4);
            for px in raster.data().chunks_exact(3) {
                rgba.extend_from_slice(&[px[0], px[1], px[2], u8::MAX]);
            }
            RgbaImage::from_raw(width, height, rgba)
                .unwrap_or_else(|| RgbaImage::new(width, height))
        }
    }
}

pub fn rgba_to_raster(img: RgbaImage) -> Result<RasterImage, TransformError> {
    let (width, height) = img.dimensions();
    RasterImage::new(width, height, PixelFormat::Rgba, img.into_raw())
}

/// Canonical encoding: RGBA PNG.
pub fn encode_png(raster: &RasterImage) -> Result<Vec<u8>, TransformError> {
    let rgba = raster_to_rgba(raster);
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| TransformError::Internal(format!("canonical PNG encode failed: {e}")))?;
    Ok(out.into_inner())
}
