//! Live/demo mode resolution.
//!
//! The credential subsystem is an external collaborator; the pipeline
//! consumes exactly one capability from it: "are we live, and if so with
//! which opaque credential". The trait seam keeps that collaborator
//! replaceable in tests.

use crate::config::PipelineConfig;

/// The outcome of consulting the credential subsystem once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMode {
    pub live: bool,
    pub credential: Option<String>,
}

impl ResolvedMode {
    pub fn demo() -> Self {
        Self {
            live: false,
            credential: None,
        }
    }

    pub fn live(credential: impl Into<String>) -> Self {
        Self {
            live: true,
            credential: Some(credential.into()),
        }
    }
}

/// Resolves the current usage mode. Consulted once per pipeline invocation.
pub trait ModeResolver: Send + Sync {
    fn resolve(&self) -> ResolvedMode;
}

/// Configuration-backed resolver: live iff a credential is configured and
/// demo mode is not forced.
pub struct EnvModeResolver {
    config: PipelineConfig,
}

impl EnvModeResolver {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }
}

impl ModeResolver for EnvModeResolver {
    fn resolve(&self) -> ResolvedMode {
        if self.config.force_demo {
            return ResolvedMode::demo();
        }
        match &self.config.gemini_api_key {
            Some(key) => ResolvedMode::live(key.clone()),
            None => ResolvedMode::demo(),
        }
    }
}
