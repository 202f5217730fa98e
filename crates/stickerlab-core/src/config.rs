//! Configuration module
//!
//! Env-driven configuration for the transformation pipeline. Credential
//! absence is a valid configuration (it selects demo mode), never an error.

use std::env;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_GENERATIVE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SEGMENTATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ASSET_BYTES: usize = 10 * 1024 * 1024;

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Bearer credential for the generative backend. Absent ⇒ demo mode.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub generative_timeout_secs: u64,
    /// Remote background-segmentation service. Absent ⇒ the ML tier is
    /// skipped and the heuristic tier carries the matte work.
    pub segmentation_endpoint: Option<String>,
    pub segmentation_api_key: Option<String>,
    pub segmentation_timeout_secs: u64,
    /// Force demo mode even when a credential is configured.
    pub force_demo: bool,
    pub max_asset_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            generative_timeout_secs: DEFAULT_GENERATIVE_TIMEOUT_SECS,
            segmentation_endpoint: None,
            segmentation_api_key: None,
            segmentation_timeout_secs: DEFAULT_SEGMENTATION_TIMEOUT_SECS,
            force_demo: false,
            max_asset_bytes: DEFAULT_MAX_ASSET_BYTES,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_model: env::var("STICKERLAB_GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            generative_timeout_secs: parse_env(
                "STICKERLAB_GENERATIVE_TIMEOUT_SECS",
                DEFAULT_GENERATIVE_TIMEOUT_SECS,
            ),
            segmentation_endpoint: env::var("STICKERLAB_SEGMENTATION_ENDPOINT")
                .ok()
                .filter(|e| !e.is_empty()),
            segmentation_api_key: env::var("STICKERLAB_SEGMENTATION_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            segmentation_timeout_secs: parse_env(
                "STICKERLAB_SEGMENTATION_TIMEOUT_SECS",
                DEFAULT_SEGMENTATION_TIMEOUT_SECS,
            ),
            force_demo: parse_bool_env("STICKERLAB_FORCE_DEMO"),
            max_asset_bytes: parse_env("STICKERLAB_MAX_ASSET_BYTES", DEFAULT_MAX_ASSET_BYTES),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool_env(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
