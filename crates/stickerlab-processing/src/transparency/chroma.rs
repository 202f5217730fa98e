//! Heuristic chroma-distance tier.
//!
//! Purely local and deterministic: the border pixels vote on a presumed
//! background color, and every pixel within a color distance of that vote
//! loses its alpha, with a linear feather band above the cutoff so edges
//! don't shear. Decent for the flat or near-flat backgrounds typical of
//! generated stickers; useless for busy photographic backgrounds, which is
//! what the degeneracy check downstream catches.

use async_trait::async_trait;
use image::RgbaImage;

use stickerlab_core::{FallbackTier, RasterImage};

use crate::codec;
use crate::transparency::{accept_matte, MatteStrategy, TierOutcome};

/// Color distance (Euclidean, RGB) at or below which a pixel is background.
const DISTANCE_THRESHOLD: f32 = 28.0;
/// Width of the linear alpha ramp above the threshold.
const FEATHER_WIDTH: f32 = 14.0;

pub struct ChromaKeyStrategy {
    threshold: f32,
    feather: f32,
}

impl Default for ChromaKeyStrategy {
    fn default() -> Self {
        Self {
            threshold: DISTANCE_THRESHOLD,
            feather: FEATHER_WIDTH,
        }
    }
}

impl ChromaKeyStrategy {
    pub fn with_thresholds(threshold: f32, feather: f32) -> Self {
        Self { threshold, feather }
    }

    /// Average the one-pixel border as the presumed background color.
    fn sample_background(img: &RgbaImage) -> [f32; 3] {
        let (width, height) = img.dimensions();
        let mut sum = [0f64; 3];
        let mut count = 0f64;
        for x in 0..width {
            for y in [0, height - 1] {
                let px = img.get_pixel(x, y);
                sum[0] += f64::from(px[0]);
                sum[1] += f64::from(px[1]);
                sum[2] += f64::from(px[2]);
                count += 1.0;
            }
        }
        for y in 0..height {
            for x in [0, width - 1] {
                let px = img.get_pixel(x, y);
                sum[0] += f64::from(px[0]);
                sum[1] += f64::from(px[1]);
                sum[2] += f64::from(px[2]);
                count += 1.0;
            }
        }
        [
            (sum[0] / count) as f32,
            (sum[1] / count) as f32,
            (sum[2] / count) as f32,
        ]
    }

    fn key_out(&self, raster: &RasterImage) -> RgbaImage {
        let src = codec::raster_to_rgba(raster);
        let background = Self::sample_background(&src);
        let (width, height) = src.dimensions();

        let mut out = RgbaImage::new(width, height);
        for (x, y, px) in src.enumerate_pixels() {
            let dr = f32::from(px[0]) - background[0];
            let dg = f32::from(px[1]) - background[1];
            let db = f32::from(px[2]) - background[2];
            let distance = (dr * dr + dg * dg + db * db).sqrt();

            let keyed_alpha = if distance <= self.threshold {
                0.0
            } else if distance < self.threshold + self.feather {
                // linear ramp through the feather band
                (distance - self.threshold) / self.feather * 255.0
            } else {
                255.0
            };
            // never raise alpha above what the source already had
            let alpha = keyed_alpha.min(f32::from(px[3])) as u8;
            out.put_pixel(x, y, image::Rgba([px[0], px[1], px[2], alpha]));
        }
        out
    }
}

#[async_trait]
impl MatteStrategy for ChromaKeyStrategy {
    fn tier(&self) -> FallbackTier {
        FallbackTier::Heuristic
    }

    async fn apply(&self, raster: &RasterImage) -> TierOutcome {
        let keyed = self.key_out(raster);
        match codec::rgba_to_raster(keyed) {
            Ok(matte) => accept_matte(matte),
            Err(e) => TierOutcome::Skip(format!("keyed raster rejected: {e}")),
        }
    }
}
