//! Transparency enforcement.
//!
//! Guarantees that every structurally valid raster comes back as RGBA, with
//! the alpha channel produced by the best strategy that actually worked.
//! Strategies form an ordered chain; each either yields a matte or skips,
//! and the first matte wins. Skips are absorbed silently; only the terminal
//! tier tag is visible to callers, and `Passthrough` is the honest "no real
//! transparency achieved" signal rather than an error.

mod chroma;
mod ml;

use std::sync::Arc;

use async_trait::async_trait;

use stickerlab_core::{FallbackTier, PixelFormat, RasterImage};
use stickerlab_services::SegmentationBackend;

pub use chroma::ChromaKeyStrategy;
pub use ml::MlMatteStrategy;

use crate::codec;

/// Minimum fraction of pixels below full opacity for a matte to count as
/// real background removal. Guards against a segmentation call that
/// "succeeds" but hands back the unmodified opaque image.
pub const MIN_TRANSPARENT_FRACTION: f64 = 0.01;

/// Outcome of one strategy attempt.
#[derive(Debug)]
pub enum TierOutcome {
    Matted(RasterImage),
    Skip(String),
}

/// One strategy in the ordered fallback chain.
#[async_trait]
pub trait MatteStrategy: Send + Sync {
    fn tier(&self) -> FallbackTier;
    async fn apply(&self, raster: &RasterImage) -> TierOutcome;
}

/// Accept a candidate matte only if it is non-degenerate.
pub(crate) fn accept_matte(candidate: RasterImage) -> TierOutcome {
    let fraction = candidate.translucent_fraction();
    if fraction >= MIN_TRANSPARENT_FRACTION {
        TierOutcome::Matted(candidate)
    } else {
        TierOutcome::Skip(format!(
            "degenerate matte: only {:.2}% of pixels below full opacity",
            fraction * 100.0
        ))
    }
}

pub struct TransparencyEnforcer {
    strategies: Vec<Box<dyn MatteStrategy>>,
}

impl TransparencyEnforcer {
    /// Standard chain: ML segmentation (when a backend is wired), then local
    /// chroma keying.
    pub fn new(segmentation: Option<Arc<dyn SegmentationBackend>>) -> Self {
        let mut strategies: Vec<Box<dyn MatteStrategy>> = Vec::new();
        if let Some(backend) = segmentation {
            strategies.push(Box::new(MlMatteStrategy::new(backend)));
        }
        strategies.push(Box::new(ChromaKeyStrategy::default()));
        Self { strategies }
    }

    /// Custom chain, mostly for tests.
    pub fn with_strategies(strategies: Vec<Box<dyn MatteStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run the chain. Total: always returns an RGBA raster and the tier that
    /// produced it.
    pub async fn enforce(&self, raster: &RasterImage) -> (RasterImage, FallbackTier) {
        for strategy in &self.strategies {
            match strategy.apply(raster).await {
                TierOutcome::Matted(matte) => {
                    tracing::debug!(tier = ?strategy.tier(), "matte accepted");
                    return (matte, strategy.tier());
                }
                TierOutcome::Skip(reason) => {
                    tracing::debug!(tier = ?strategy.tier(), %reason, "matte strategy skipped");
                }
            }
        }
        (passthrough(raster), FallbackTier::Passthrough)
    }
}

/// Last-resort tier: the input unchanged, with alpha forced fully opaque
/// when the source had none.
fn passthrough(raster: &RasterImage) -> RasterImage {
    match raster.format() {
        PixelFormat::Rgba => raster.clone(),
        PixelFormat::Rgb => {
            let rgba = codec::raster_to_rgba(raster);
            codec::rgba_to_raster(rgba)
                .unwrap_or_else(|_| raster.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysSkip;

    #[async_trait]
    impl MatteStrategy for AlwaysSkip {
        fn tier(&self) -> FallbackTier {
            FallbackTier::Ml
        }
        async fn apply(&self, _raster: &RasterImage) -> TierOutcome {
            TierOutcome::Skip("backend unavailable".into())
        }
    }

    fn flat_rgb(width: u32, height: u32, color: [u8; 3]) -> RasterImage {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        RasterImage::new(width, height, PixelFormat::Rgb, data).unwrap()
    }

    #[tokio::test]
    async fn empty_chain_falls_through_to_passthrough() {
        let enforcer = TransparencyEnforcer::with_strategies(vec![]);
        let input = flat_rgb(4, 4, [10, 20, 30]);
        let (out, tier) = enforcer.enforce(&input).await;
        assert_eq!(tier, FallbackTier::Passthrough);
        assert_eq!(out.format(), PixelFormat::Rgba);
        assert_eq!(out.translucent_fraction(), 0.0);
    }

    #[tokio::test]
    async fn skipping_strategies_are_absorbed_silently() {
        let enforcer = TransparencyEnforcer::with_strategies(vec![
            Box::new(AlwaysSkip),
            Box::new(ChromaKeyStrategy::default()),
        ]);
        // Flat background: chroma keying wipes it all, which is non-degenerate
        let input = flat_rgb(16, 16, [0, 200, 0]);
        let (out, tier) = enforcer.enforce(&input).await;
        assert_eq!(tier, FallbackTier::Heuristic);
        assert!(out.translucent_fraction() >= MIN_TRANSPARENT_FRACTION);
    }

    #[test]
    fn degenerate_matte_is_rejected() {
        let opaque =
            RasterImage::new(10, 10, PixelFormat::Rgba, vec![255u8; 400]).unwrap();
        assert!(matches!(accept_matte(opaque), TierOutcome::Skip(_)));

        let mut data = vec![255u8; 400];
        for px in data.chunks_exact_mut(4).take(50) {
            px[3] = 0;
        }
        let matte = RasterImage::new(10, 10, PixelFormat::Rgba, data).unwrap();
        assert!(matches!(accept_matte(matte), TierOutcome::Matted(_)));
    }

    #[test]
    fn totality_over_valid_rasters() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let enforcer = TransparencyEnforcer::with_strategies(vec![Box::new(
            ChromaKeyStrategy::default(),
        )]);
        for (w, h) in [(1, 1), (3, 7), (64, 64)] {
            let input = flat_rgb(w, h, [128, 128, 128]);
            let (out, _tier) = rt.block_on(enforcer.enforce(&input));
            assert_eq!(out.format(), PixelFormat::Rgba);
        }
    }
}
