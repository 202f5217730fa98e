//! ML segmentation tier.
//!
//! Best quality, least reliable: a remote learned matte. Every failure mode
//! (transport error, timeout, undecodable response, wrong dimensions,
//! degenerate alpha) is a skip, never an error, and the next tier carries on.

use std::sync::Arc;

use async_trait::async_trait;

use stickerlab_core::{FallbackTier, PixelFormat, RasterImage};
use stickerlab_services::SegmentationBackend;

use crate::codec;
use crate::transparency::{accept_matte, MatteStrategy, TierOutcome};

pub struct MlMatteStrategy {
    backend: Arc<dyn SegmentationBackend>,
}

impl MlMatteStrategy {
    pub fn new(backend: Arc<dyn SegmentationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl MatteStrategy for MlMatteStrategy {
    fn tier(&self) -> FallbackTier {
        FallbackTier::Ml
    }

    async fn apply(&self, raster: &RasterImage) -> TierOutcome {
        let png = match codec::encode_png(raster) {
            Ok(png) => png,
            Err(e) => return TierOutcome::Skip(format!("could not encode input: {e}")),
        };

        let cutout_bytes = match self.backend.remove_background(&png).await {
            Ok(bytes) => bytes,
            Err(e) => return TierOutcome::Skip(format!("segmentation failed: {e}")),
        };

        let cutout = match codec::decode_raster(&cutout_bytes) {
            Ok(cutout) => cutout,
            Err(e) => return TierOutcome::Skip(format!("cutout did not decode: {e}")),
        };

        if cutout.format() != PixelFormat::Rgba {
            return TierOutcome::Skip("cutout carries no alpha channel".into());
        }
        if (cutout.width(), cutout.height()) != (raster.width(), raster.height()) {
            return TierOutcome::Skip(format!(
                "cutout is {}x{}, input was {}x{}",
                cutout.width(),
                cutout.height(),
                raster.width(),
                raster.height()
            ));
        }

        accept_matte(cutout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use stickerlab_core::TransformError;

    struct CannedSegmentation {
        response: Vec<u8>,
    }

    #[async_trait]
    impl SegmentationBackend for CannedSegmentation {
        async fn remove_background(&self, _png: &[u8]) -> Result<Vec<u8>, TransformError> {
            Ok(self.response.clone())
        }
    }

    struct FailingSegmentation;

    #[async_trait]
    impl SegmentationBackend for FailingSegmentation {
        async fn remove_background(&self, _png: &[u8]) -> Result<Vec<u8>, TransformError> {
            Err(TransformError::Timeout {
                stage: "segmentation call",
                seconds: 30,
            })
        }
    }

    fn rgba_png(width: u32, height: u32, alpha: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| Rgba([100, 100, 100, alpha(x, y)]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn opaque_input(width: u32, height: u32) -> RasterImage {
        RasterImage::new(
            width,
            height,
            PixelFormat::Rgb,
            vec![80; (width * height * 3) as usize],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn usable_cutout_is_accepted() {
        // half the pixels transparent
        let strategy = MlMatteStrategy::new(Arc::new(CannedSegmentation {
            response: rgba_png(8, 8, |x, _| if x < 4 { 0 } else { 255 }),
        }));
        let outcome = strategy.apply(&opaque_input(8, 8)).await;
        assert!(matches!(outcome, TierOutcome::Matted(_)));
    }

    #[tokio::test]
    async fn uniformly_opaque_cutout_is_degenerate() {
        let strategy = MlMatteStrategy::new(Arc::new(CannedSegmentation {
            response: rgba_png(8, 8, |_, _| 255),
        }));
        let outcome = strategy.apply(&opaque_input(8, 8)).await;
        assert!(matches!(outcome, TierOutcome::Skip(_)));
    }

    #[tokio::test]
    async fn wrong_dimensions_are_skipped() {
        let strategy = MlMatteStrategy::new(Arc::new(CannedSegmentation {
            response: rgba_png(4, 4, |_, _| 0),
        }));
        let outcome = strategy.apply(&opaque_input(8, 8)).await;
        assert!(matches!(outcome, TierOutcome::Skip(_)));
    }

    #[tokio::test]
    async fn backend_timeout_is_a_skip_not_an_error() {
        let strategy = MlMatteStrategy::new(Arc::new(FailingSegmentation));
        let outcome = strategy.apply(&opaque_input(8, 8)).await;
        assert!(matches!(outcome, TierOutcome::Skip(_)));
    }
}
