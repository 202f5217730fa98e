//! Stickerlab Media Processing Library
//!
//! Pixel-level stages of the transformation pipeline: raster codec, media
//! classification (including GIF container inspection), the tiered
//! transparency enforcer, the local demo simulator, and representative-frame
//! extraction for animated assets.

pub mod classify;
pub mod codec;
pub mod demo;
pub mod frames;
pub mod gif;
pub mod transparency;

// Re-export commonly used types
pub use classify::classify;
pub use demo::DemoSimulator;
pub use transparency::{MatteStrategy, TierOutcome, TransparencyEnforcer};
