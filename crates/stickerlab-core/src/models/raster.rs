use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Pixel layout of a raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// An in-memory bitmap.
///
/// Pipeline stages never mutate a raster in place; each stage consumes its
/// input and returns a fresh `RasterImage`, which keeps every stage contract
/// independently assertable. When `format` is `Rgba` the alpha byte is
/// semantically meaningful: a stage that cannot produce a real matte must
/// say so through its tier tag, not by tagging opaque pixels as RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl RasterImage {
    /// Build a raster, validating that the buffer length matches the
    /// dimensions and pixel format exactly.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, TransformError> {
        if width == 0 || height == 0 {
            return Err(TransformError::MalformedAsset(format!(
                "zero-sized raster ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(TransformError::MalformedAsset(format!(
                "raster buffer is {} bytes, expected {} for {}x{} {:?}",
                data.len(),
                expected,
                width,
                height,
                format
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn has_alpha(&self) -> bool {
        self.format == PixelFormat::Rgba
    }

    /// Fraction of pixels with alpha below full opacity. Always 0.0 for RGB.
    pub fn translucent_fraction(&self) -> f64 {
        if self.format != PixelFormat::Rgba {
            return 0.0;
        }
        let total = (self.width as usize) * (self.height as usize);
        if total == 0 {
            return 0.0;
        }
        let translucent = self
            .data
            .chunks_exact(4)
            .filter(|px| px[3] < u8::MAX)
            .count();
        translucent as f64 / total as f64
    }
}
