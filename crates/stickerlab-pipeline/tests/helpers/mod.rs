//! Shared fixtures and mock collaborators for pipeline integration tests.

// Each integration-test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::codecs::gif::GifEncoder;
use image::{Delay, DynamicImage, Frame, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use stickerlab_core::{ModeResolver, ResolvedMode, Resolution, TransformError, UsageCounter};
use stickerlab_pipeline::TransformPipeline;
use stickerlab_processing::TransparencyEnforcer;
use stickerlab_services::GenerativeBackend;

/// Resolver pinned to a fixed mode, standing in for the credential subsystem.
pub struct FixedResolver(pub ResolvedMode);

impl ModeResolver for FixedResolver {
    fn resolve(&self) -> ResolvedMode {
        self.0.clone()
    }
}

/// Backend that fails the test if the pipeline ever reaches the network.
pub struct PanickingBackend;

#[async_trait]
impl GenerativeBackend for PanickingBackend {
    async fn edit_image(
        &self,
        _credential: &str,
        _png: &[u8],
        _instruction: &str,
    ) -> Result<Vec<u8>, TransformError> {
        panic!("demo mode must not touch the generative backend");
    }

    async fn generate_image(
        &self,
        _credential: &str,
        _prompt: &str,
        _resolution: Resolution,
    ) -> Result<Vec<u8>, TransformError> {
        panic!("demo mode must not touch the generative backend");
    }
}

/// Backend returning a canned candidate and counting how often it was asked.
pub struct CannedBackend {
    pub response: Vec<u8>,
    pub calls: AtomicUsize,
}

impl CannedBackend {
    pub fn new(response: Vec<u8>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeBackend for CannedBackend {
    async fn edit_image(
        &self,
        _credential: &str,
        _png: &[u8],
        _instruction: &str,
    ) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    async fn generate_image(
        &self,
        _credential: &str,
        _prompt: &str,
        _resolution: Resolution,
    ) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Backend that always refuses with an empty candidate list.
pub struct RefusingBackend {
    pub calls: AtomicUsize,
}

impl RefusingBackend {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeBackend for RefusingBackend {
    async fn edit_image(
        &self,
        _credential: &str,
        _png: &[u8],
        _instruction: &str,
    ) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransformError::EmptyGeneration)
    }

    async fn generate_image(
        &self,
        _credential: &str,
        _prompt: &str,
        _resolution: Resolution,
    ) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransformError::EmptyGeneration)
    }
}

/// Assemble a pipeline around mock collaborators. No segmentation backend is
/// wired, so the live transparency chain is chroma keying then passthrough.
pub fn pipeline_with(
    mode: ResolvedMode,
    backend: Arc<dyn GenerativeBackend>,
) -> TransformPipeline {
    TransformPipeline::new(
        Arc::new(FixedResolver(mode)),
        backend,
        TransparencyEnforcer::new(None),
        Arc::new(UsageCounter::new()),
        10 * 1024 * 1024,
    )
}

pub fn opaque_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        // busy-ish interior so demo sampling has something to average
        Rgb([120, ((x + y) % 200) as u8, 90])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

/// A candidate image the way a generative backend would return one: a
/// contrasting subject on a flat background, opaque, PNG-encoded.
pub fn subject_on_flat_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let inside = x > width / 4 && x < width * 3 / 4 && y > height / 4 && y < height * 3 / 4;
        if inside {
            Rgba([230, 60, 40, 255])
        } else {
            Rgba([20, 180, 80, 255])
        }
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

pub fn animated_gif(frames: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        for i in 0..frames {
            let img = RgbaImage::from_pixel(8, 8, Rgba([(i * 40) as u8, 100, 200, 255]));
            let frame = Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(80, 1));
            encoder.encode_frame(frame).unwrap();
        }
    }
    out
}
