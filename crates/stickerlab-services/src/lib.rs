//! Stickerlab Services
//!
//! HTTP clients for the two external collaborators: the generative image
//! backend and the remote background-segmentation service. Both sit behind
//! async traits so the pipeline and its tests can swap transports.

pub mod generative;
pub mod segmentation;

pub use generative::{GeminiImageClient, GenerativeBackend};
pub use segmentation::{MatteServiceClient, SegmentationBackend};
