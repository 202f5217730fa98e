//! Stickerlab Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, and
//! usage accounting shared across all stickerlab components. It deliberately
//! carries no image-processing or HTTP dependencies; pixel work lives in
//! `stickerlab-processing` and transport in `stickerlab-services`.

pub mod config;
pub mod error;
pub mod mode;
pub mod models;
pub mod usage;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{TransformError, UserAction};
pub use mode::{EnvModeResolver, ModeResolver, ResolvedMode};
pub use models::{
    FallbackTier, MediaAsset, MediaProbe, PixelFormat, RasterImage, Resolution, TransformRequest,
    TransformResult, UsageMode,
};
pub use usage::UsageCounter;
