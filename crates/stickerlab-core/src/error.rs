//! Error types module
//!
//! All pipeline failures are unified under the `TransformError` enum. The
//! variants form the full failure taxonomy of the transformation pipeline;
//! callers branch on the variant (or on `user_action()`) rather than on
//! message text.

/// The user-facing remediation class for a failure.
///
/// Fatal input problems and backend refusals ask for a different image,
/// stage timeouts ask for a retry, transport failures point at connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    TryDifferentImage,
    TryAgain,
    CheckConnectivity,
}

impl UserAction {
    pub fn describe(self) -> &'static str {
        match self {
            UserAction::TryDifferentImage => "Try a different image or prompt",
            UserAction::TryAgain => "Try again in a moment",
            UserAction::CheckConnectivity => "Check your connection and backend status",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Request-shape violation: empty asset, blank prompt.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The byte buffer cannot be parsed as a recognizable container for its
    /// declared type. Fatal, never retried.
    #[error("malformed asset: {0}")]
    MalformedAsset(String),

    /// A recognized container whose raster payload would not decode.
    #[error("failed to decode asset: {0}")]
    AssetDecode(String),

    /// The generative backend answered successfully but produced no inline
    /// image candidate. Retrying the same prompt/image would burn quota for
    /// the same refusal, so this is fatal for the call.
    #[error("generative backend returned no image candidate")]
    EmptyGeneration,

    /// A stage-local timeout. The transparency tiers absorb their own
    /// timeouts; a generative-call timeout surfaces to the caller.
    #[error("{stage} timed out after {seconds}s")]
    Timeout { stage: &'static str, seconds: u64 },

    /// Transport or API failure talking to an external service. The message
    /// carries any status text salvaged from the response body.
    #[error("backend request failed: {message}")]
    Backend {
        status: Option<u16>,
        message: String,
    },

    /// Invariant violation inside the pipeline itself (e.g. a canonical PNG
    /// re-encode of an already-validated raster failing).
    #[error("internal error: {0}")]
    Internal(String),
}

impl TransformError {
    /// Classify this error into one of the three user-visible remediation
    /// classes.
    pub fn user_action(&self) -> UserAction {
        match self {
            TransformError::InvalidRequest(_)
            | TransformError::MalformedAsset(_)
            | TransformError::AssetDecode(_)
            | TransformError::EmptyGeneration => UserAction::TryDifferentImage,
            TransformError::Timeout { .. } | TransformError::Internal(_) => UserAction::TryAgain,
            TransformError::Backend { .. } => UserAction::CheckConnectivity,
        }
    }

    /// Single human-readable message combining the failure and the suggested
    /// remediation.
    pub fn user_message(&self) -> String {
        format!("{}. {}.", self, self.user_action().describe())
    }
}
