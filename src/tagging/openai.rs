//! Azure OpenAI text tagger implementation.
//!
//! This module provides an implementation of the `TextTagger` trait using an
//! Azure OpenAI chat-completions deployment constrained by a fixed system
//! prompt to answer with a single keyword.

use super::{join_url, normalize_keyword, TaggingError, TaggingResult, TextTagger};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default chat deployment name.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-35-turbo";

/// Default Azure OpenAI REST API version.
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Instruction sent as the system message on every request.
pub const SYSTEM_PROMPT: &str = "Your job is to extract ONE simple keyword that represents a travel destination type based on the user's message.
Only return one of these words: beach, mountain, temple, nature, hiking, city, culture, history, island, adventure, surfing.
If the user mentions hiking or quiet nature, return \"mountain\".
If the user mentions spiritual or ancient sites, return \"temple\".
Do NOT explain. ONLY return the one keyword.";

const MAX_TOKENS: u32 = 10;

/// Connection settings for an Azure OpenAI resource.
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com/`
    pub endpoint: String,

    /// Value of the `api-key` header
    pub api_key: String,

    /// Chat deployment name
    pub deployment: String,

    /// REST API version query parameter
    pub api_version: String,
}

impl AzureOpenAiConfig {
    /// Create a configuration with the default deployment and API version.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Full chat-completions URL for the configured deployment.
    pub fn completions_url(&self) -> String {
        let path = format!("openai/deployments/{}/chat/completions", self.deployment);
        format!(
            "{}?api-version={}",
            join_url(&self.endpoint, &path),
            self.api_version
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text tagger backed by an Azure OpenAI chat deployment.
#[derive(Debug, Clone)]
pub struct AzureOpenAiTagger {
    config: AzureOpenAiConfig,
    client: reqwest::Client,
}

impl AzureOpenAiTagger {
    /// Create a new tagger.
    ///
    /// # Arguments
    /// * `config` - Endpoint, key and deployment settings
    /// * `client` - Shared HTTP client (timeouts are configured on it)
    pub fn new(config: AzureOpenAiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn build_request<'a>(text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl TextTagger for AzureOpenAiTagger {
    async fn keyword(&self, text: &str) -> TaggingResult<String> {
        let response = self
            .client
            .post(self.config.completions_url())
            .header("api-key", &self.config.api_key)
            .json(&Self::build_request(text))
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

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TaggingError::MalformedResponse("no choices returned".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let keyword = normalize_keyword(&content);
        tracing::debug!(keyword = %keyword, "OpenAI keyword");
        Ok(keyword)
    }

    fn name(&self) -> &str {
        "azure-openai"
    }
}
