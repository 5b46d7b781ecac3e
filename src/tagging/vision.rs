//! Azure Computer Vision image tagger implementation.
//!
//! Sends raw image bytes to the v3.2 `analyze` endpoint with the `Tags`
//! visual feature and returns the tag names in service order.

use std::path::Path;

use super::{join_url, ImageTagger, TaggingError, TaggingResult};
use async_trait::async_trait;
use serde::Deserialize;

const ANALYZE_PATH: &str = "vision/v3.2/analyze?visualFeatures=Tags";

/// Connection settings for an Azure Computer Vision resource.
#[derive(Debug, Clone)]
pub struct AzureVisionConfig {
    /// Resource endpoint, e.g. `https://my-vision.cognitiveservices.azure.com/`
    pub endpoint: String,

    /// Value of the `Ocp-Apim-Subscription-Key` header
    pub subscription_key: String,
}

impl AzureVisionConfig {
    pub fn new(endpoint: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
        }
    }

    pub fn analyze_url(&self) -> String {
        join_url(&self.endpoint, ANALYZE_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    tags: Vec<ImageTag>,
}

#[derive(Debug, Deserialize)]
struct ImageTag {
    name: String,
    #[serde(default)]
    confidence: f32,
}

/// Image tagger backed by Azure Computer Vision.
#[derive(Debug, Clone)]
pub struct AzureVisionTagger {
    config: AzureVisionConfig,
    client: reqwest::Client,
}

impl AzureVisionTagger {
    pub fn new(config: AzureVisionConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl ImageTagger for AzureVisionTagger {
    async fn tags(&self, path: &Path) -> TaggingResult<Vec<String>> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            TaggingError::InvalidInput(format!("failed to read {}: {}", path.display(), e))
        })?;

        let response = self
            .client
            .post(self.config.analyze_url())
            .header("Content-Type", "application/octet-stream")
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaggingError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalyzeResponse = response.json().await?;
        if let Some(top) = parsed.tags.first() {
            tracing::debug!(top = %top.name, confidence = top.confidence, count = parsed.tags.len(), "Vision tags");
        }

        Ok(parsed
            .tags
            .into_iter()
            .map(|tag| tag.name.to_lowercase())
            .collect())
    }

    fn name(&self) -> &str {
        "azure-vision"
    }
}
