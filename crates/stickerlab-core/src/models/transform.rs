use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::models::{MediaAsset, RasterImage};

/// Output resolution for prompt-based generation.
///
/// Displayed as "1K"/"2K"/"4K"; parses from both the tier names and the
/// pixel spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Low,
    Mid,
    High,
}

impl Resolution {
    /// Longest output edge in pixels.
    pub fn edge_px(self) -> u32 {
        match self {
            Resolution::Low => 1024,
            Resolution::Mid => 2048,
            Resolution::High => 4096,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Resolution::Low => "1K",
            Resolution::Mid => "2K",
            Resolution::High => "4K",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Resolution {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "1k" | "1024" => Ok(Resolution::Low),
            "mid" | "2k" | "2048" => Ok(Resolution::Mid),
            "high" | "4k" | "4096" => Ok(Resolution::High),
            other => Err(TransformError::InvalidRequest(format!(
                "unknown resolution '{other}' (expected low/mid/high or 1k/2k/4k)"
            ))),
        }
    }
}

/// Whether a run went against the real generative backend or the local
/// simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageMode {
    Live,
    Demo,
}

/// Which transparency strategy produced the final matte.
///
/// `None` means the enforcer did not run at all (demo path). `Passthrough`
/// means it ran and no strategy achieved real transparency, a soft failure
/// the caller should surface, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackTier {
    None,
    Ml,
    Heuristic,
    Passthrough,
}

impl FallbackTier {
    /// True when the output's alpha channel genuinely encodes background
    /// removal.
    pub fn achieved_transparency(self) -> bool {
        matches!(self, FallbackTier::Ml | FallbackTier::Heuristic)
    }
}

/// The one call surface both public operations feed into.
#[derive(Debug, Clone)]
pub enum TransformRequest {
    TextRemoval { asset: MediaAsset },
    Generation { prompt: String, resolution: Resolution },
}

impl TransformRequest {
    pub fn validate(&self) -> Result<(), TransformError> {
        match self {
            // MediaAsset construction already rejects empty buffers; the
            // check here keeps the request invariant self-contained.
            TransformRequest::TextRemoval { asset } => {
                if asset.is_empty() {
                    return Err(TransformError::InvalidRequest(
                        "text removal requires a non-empty asset".into(),
                    ));
                }
                Ok(())
            }
            TransformRequest::Generation { prompt, .. } => {
                if prompt.trim().is_empty() {
                    return Err(TransformError::InvalidRequest(
                        "generation requires a non-empty prompt".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TransformRequest::TextRemoval { .. } => "text_removal",
            TransformRequest::Generation { .. } => "generation",
        }
    }
}

/// Terminal output of a pipeline run.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub raster: RasterImage,
    pub mode: UsageMode,
    pub tier: FallbackTier,
    /// Set when the input was animated and only the representative first
    /// frame was transformed.
    pub representative_frame: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_parses_both_spellings() {
        assert_eq!("low".parse::<Resolution>().unwrap(), Resolution::Low);
        assert_eq!("2K".parse::<Resolution>().unwrap(), Resolution::Mid);
        assert_eq!("4096".parse::<Resolution>().unwrap(), Resolution::High);
        assert!("8k".parse::<Resolution>().is_err());
    }

    #[test]
    fn resolution_edges() {
        assert_eq!(Resolution::Low.edge_px(), 1024);
        assert_eq!(Resolution::Mid.edge_px(), 2048);
        assert_eq!(Resolution::High.edge_px(), 4096);
        assert_eq!(Resolution::High.to_string(), "4K");
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let req = TransformRequest::Generation {
            prompt: "   \n".into(),
            resolution: Resolution::Low,
        };
        assert!(matches!(
            req.validate(),
            Err(TransformError::InvalidRequest(_))
        ));
    }

    #[test]
    fn only_matting_tiers_count_as_transparent() {
        assert!(FallbackTier::Ml.achieved_transparency());
        assert!(FallbackTier::Heuristic.achieved_transparency());
        assert!(!FallbackTier::Passthrough.achieved_transparency());
        assert!(!FallbackTier::None.achieved_transparency());
    }
}
