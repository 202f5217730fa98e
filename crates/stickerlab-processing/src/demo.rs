//! Demo simulator.
//!
//! The fully local stand-in for the generative backend when no credential is
//! configured. Never performs network I/O and is deterministic for a given
//! input: the same pixels in, the same pixels out. Demo output is
//! illustrative: it mimics what the live path would do well enough for a UI
//! walkthrough, and it is always labeled `Demo` so nobody mistakes it for a
//! real edit.

use image::{Rgba, RgbaImage};

use stickerlab_core::{RasterImage, Resolution, TransformError};

use crate::codec;

/// Fraction of image height presumed to hold caption text.
const CAPTION_BAND_FRACTION: u32 = 4; // bottom 1/4
/// Top-right watermark region, as fractions of width/height.
const WATERMARK_WIDTH_DIV: u32 = 5; // right 1/5
const WATERMARK_HEIGHT_DIV: u32 = 10; // top 1/10

// Placeholder palette for prompt generation
const PLACEHOLDER_TOP: [u8; 3] = [72, 88, 160];
const PLACEHOLDER_BOTTOM: [u8; 3] = [24, 28, 44];
const PLACEHOLDER_PANEL: [u8; 3] = [214, 220, 236];

pub struct DemoSimulator;

impl DemoSimulator {
    /// Simulated text removal: flood the bottom caption band with a
    /// background color sampled just above it, and blank the presumed
    /// watermark corner. Output stays fully opaque wherever the input was;
    /// the demo path does not enforce transparency.
    pub fn remove_text(raster: &RasterImage) -> Result<RasterImage, TransformError> {
        let mut img = codec::raster_to_rgba(raster);
        let (width, height) = img.dimensions();

        let band_top = height - height / CAPTION_BAND_FRACTION;
        if band_top > 0 && band_top < height {
            let fill = Self::average_row(&img, band_top - 1);
            for y in band_top..height {
                for x in 0..width {
                    img.put_pixel(x, y, fill);
                }
            }
        }

        let wm_width = width / WATERMARK_WIDTH_DIV;
        let wm_height = height / WATERMARK_HEIGHT_DIV;
        if wm_width > 0 && wm_height > 0 && wm_width < width {
            let wm_left = width - wm_width;
            let fill = Self::average_column(&img, wm_left - 1, wm_height);
            for y in 0..wm_height {
                for x in wm_left..width {
                    img.put_pixel(x, y, fill);
                }
            }
        }

        codec::rgba_to_raster(img)
    }

    /// Simulated generation: a fixed gradient-and-panel placeholder at the
    /// requested resolution. The prompt does not influence the pixels; demo
    /// mode is explicitly not generative.
    pub fn generate_placeholder(prompt: &str, resolution: Resolution) -> RasterImage {
        tracing::debug!(prompt_len = prompt.len(), %resolution, "rendering demo placeholder");
        let edge = resolution.edge_px();
        let img = RgbaImage::from_fn(edge, edge, |x, y| {
            let t = y as f32 / edge as f32;
            let margin = edge / 8;
            let in_panel = x >= margin && x < edge - margin && y >= margin && y < edge - margin;
            if in_panel {
                Rgba([
                    PLACEHOLDER_PANEL[0],
                    PLACEHOLDER_PANEL[1],
                    PLACEHOLDER_PANEL[2],
                    255,
                ])
            } else {
                Rgba([
                    lerp(PLACEHOLDER_TOP[0], PLACEHOLDER_BOTTOM[0], t),
                    lerp(PLACEHOLDER_TOP[1], PLACEHOLDER_BOTTOM[1], t),
                    lerp(PLACEHOLDER_TOP[2], PLACEHOLDER_BOTTOM[2], t),
                    255,
                ])
            }
        });
        // from_fn output always satisfies the buffer invariant
        codec::rgba_to_raster(img).expect("placeholder raster is well-formed")
    }

    fn average_row(img: &RgbaImage, y: u32) -> Rgba<u8> {
        let width = img.width();
        let mut sum = [0u64; 3];
        for x in 0..width {
            let px = img.get_pixel(x, y);
            sum[0] += u64::from(px[0]);
            sum[1] += u64::from(px[1]);
            sum[2] += u64::from(px[2]);
        }
        let n = u64::from(width);
        Rgba([
            (sum[0] / n) as u8,
            (sum[1] / n) as u8,
            (sum[2] / n) as u8,
            255,
        ])
    }

    fn average_column(img: &RgbaImage, x: u32, rows: u32) -> Rgba<u8> {
        let rows = rows.max(1);
        let mut sum = [0u64; 3];
        for y in 0..rows {
            let px = img.get_pixel(x, y);
            sum[0] += u64::from(px[0]);
            sum[1] += u64::from(px[1]);
            sum[2] += u64::from(px[2]);
        }
        let n = u64::from(rows);
        Rgba([
            (sum[0] / n) as u8,
            (sum[1] / n) as u8,
            (sum[2] / n) as u8,
            255,
        ])
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (f32::from(a) + (f32::from(b) - f32::from(a)) * t) as u8
}
