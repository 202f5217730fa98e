//! Gemini image generation/editing client.
//!
//! One call is one request/response exchange producing at most one inline
//! image candidate. The client is stateless: the bearer credential comes in
//! per call from mode resolution, never stored here.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use stickerlab_core::{Resolution, TransformError};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const CANONICAL_IMAGE_MIME: &str = "image/png";

/// A single request/response exchange with the generative image backend.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Edit an existing image under a fixed instruction. `png` must already
    /// be in the canonical encoding.
    async fn edit_image(
        &self,
        credential: &str,
        png: &[u8],
        instruction: &str,
    ) -> Result<Vec<u8>, TransformError>;

    /// Generate a fresh image from a prompt at the requested resolution.
    async fn generate_image(
        &self,
        credential: &str,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Vec<u8>, TransformError>;
}

// generateContent request/response bodies
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    image_size: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
    #[allow(dead_code)]
    text: Option<String>,
}

/// Extract the first inline image candidate from a response.
///
/// A structurally successful response with no image (safety refusal, text-only
/// answer) is `EmptyGeneration`; repeating the same call would hit the same
/// refusal and burn quota, so the caller must not retry.
fn extract_inline_image(response: GenerateContentResponse) -> Result<Vec<u8>, TransformError> {
    let part = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.inline_data)
        .ok_or(TransformError::EmptyGeneration)?;

    STANDARD
        .decode(part.data.as_bytes())
        .map_err(|e| TransformError::Backend {
            status: None,
            message: format!("candidate image is not valid base64: {e}"),
        })
}

/// Gemini `generateContent` client for image editing and generation.
pub struct GeminiImageClient {
    http_client: reqwest::Client,
    model: String,
    timeout_secs: u64,
}

impl GeminiImageClient {
    pub fn new(model: impl Into<String>, timeout_secs: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to create HTTP client for Gemini API, using default client");
                reqwest::Client::default()
            });

        Self {
            http_client,
            model: model.into(),
            timeout_secs,
        }
    }

    fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", GEMINI_API_BASE, self.model)
    }

    async fn generate_content(
        &self,
        credential: &str,
        parts: Vec<Part>,
        image_size: Option<String>,
    ) -> Result<Vec<u8>, TransformError> {
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: image_size.map(|s| ImageConfig { image_size: s }),
            },
        };

        tracing::debug!(model = %self.model, "Sending generateContent request");

        let response = self
            .http_client
            .post(self.generate_content_url())
            .header("x-goog-api-key", credential)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransformError::Backend {
                status: Some(status.as_u16()),
                message: format!("Gemini API failed with status {status}: {error_text}"),
            });
        }

        let decoded: GenerateContentResponse =
            response.json().await.map_err(|e| TransformError::Backend {
                status: None,
                message: format!("failed to parse Gemini API response: {e}"),
            })?;

        extract_inline_image(decoded)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> TransformError {
        if err.is_timeout() {
            TransformError::Timeout {
                stage: "generative call",
                seconds: self.timeout_secs,
            }
        } else {
            TransformError::Backend {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiImageClient {
    async fn edit_image(
        &self,
        credential: &str,
        png: &[u8],
        instruction: &str,
    ) -> Result<Vec<u8>, TransformError> {
        let parts = vec![
            Part::Text(instruction.to_string()),
            Part::InlineData(InlineData {
                mime_type: CANONICAL_IMAGE_MIME.to_string(),
                data: STANDARD.encode(png),
            }),
        ];
        self.generate_content(credential, parts, None).await
    }

    async fn generate_image(
        &self,
        credential: &str,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Vec<u8>, TransformError> {
        let parts = vec![Part::Text(prompt.to_string())];
        self.generate_content(credential, parts, Some(resolution.to_string()))
            .await
    }
}
