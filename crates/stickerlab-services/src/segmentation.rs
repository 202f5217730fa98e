//! Remote background-segmentation client (the ML matte tier's transport).
//!
//! The service contract is byte-in/byte-out: POST a canonical PNG, receive an
//! RGBA PNG cutout. Whether the result is usable is judged by the
//! transparency enforcer, not here.

use std::time::Duration;

use async_trait::async_trait;

use stickerlab_core::TransformError;

/// Learned background/foreground segmentation over the wire.
#[async_trait]
pub trait SegmentationBackend: Send + Sync {
    async fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>, TransformError>;
}

pub struct MatteServiceClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl MatteServiceClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to create HTTP client for segmentation service, using default client");
                reqwest::Client::default()
            });

        Self {
            http_client,
            endpoint: endpoint.into(),
            api_key,
            timeout_secs,
        }
    }
}

#[async_trait]
impl SegmentationBackend for MatteServiceClient {
    async fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>, TransformError> {
        tracing::debug!(bytes = png.len(), endpoint = %self.endpoint, "Sending segmentation request");

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .header("content-type", "image/png")
            .body(png.to_vec());
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransformError::Timeout {
                    stage: "segmentation call",
                    seconds: self.timeout_secs,
                }
            } else {
                TransformError::Backend {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransformError::Backend {
                status: Some(status.as_u16()),
                message: format!("segmentation service failed with status {status}: {error_text}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TransformError::Backend {
            status: None,
            message: format!("failed to read segmentation response: {e}"),
        })?;

        Ok(bytes.to_vec())
    }
}
