//! Process configuration.
//!
//! All settings come from command-line flags with environment-variable
//! fallbacks, read once at startup. The binary loads a `.env` file first, so
//! the usual `OPENAI_ENDPOINT`, `VISION_KEY`, `COSMOS_ENDPOINT`, ... variables
//! work unchanged.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::query::Recommender;
use crate::server::ServerConfig;
use crate::storage::cosmos::{CosmosConfig, CosmosStore, DEFAULT_CONTAINER, DEFAULT_DATABASE};
use crate::storage::StorageError;
use crate::tagging::openai::{AzureOpenAiConfig, AzureOpenAiTagger, DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT};
use crate::tagging::vision::{AzureVisionConfig, AzureVisionTagger};

/// Upper bound accepted for `--max-upload-mb`.
pub const MAX_UPLOAD_MB_LIMIT: u64 = 4096;

/// Errors raised while turning configuration into live clients.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// The store client rejected its settings
    #[error("Store configuration error: {0}")]
    Storage(#[from] StorageError),
}

/// Travel Bot: suggest destinations from a description or a photo.
#[derive(Parser, Clone)]
#[command(
    name = "travel-bot",
    version,
    about = "Suggest travel destinations from free text and/or an image"
)]
pub struct AppConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Azure OpenAI resource endpoint
    #[arg(long, env = "OPENAI_ENDPOINT")]
    pub openai_endpoint: String,

    /// Azure OpenAI API key
    #[arg(long, env = "OPENAI_KEY", hide_env_values = true)]
    pub openai_key: String,

    /// Chat deployment used for keyword extraction
    #[arg(long, env = "OPENAI_DEPLOYMENT", default_value = DEFAULT_DEPLOYMENT)]
    pub openai_deployment: String,

    /// Azure OpenAI REST API version
    #[arg(long, env = "OPENAI_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub openai_api_version: String,

    /// Azure Computer Vision endpoint
    #[arg(long, env = "VISION_ENDPOINT")]
    pub vision_endpoint: String,

    /// Azure Computer Vision subscription key
    #[arg(long, env = "VISION_KEY", hide_env_values = true)]
    pub vision_key: String,

    /// Cosmos DB account endpoint
    #[arg(long, env = "COSMOS_ENDPOINT")]
    pub cosmos_endpoint: String,

    /// Cosmos DB master key (base64)
    #[arg(long, env = "COSMOS_KEY", hide_env_values = true)]
    pub cosmos_key: String,

    /// Cosmos DB database id
    #[arg(long, env = "COSMOS_DATABASE", default_value = DEFAULT_DATABASE)]
    pub cosmos_database: String,

    /// Cosmos DB container id
    #[arg(long, env = "COSMOS_CONTAINER", default_value = DEFAULT_CONTAINER)]
    pub cosmos_container: String,

    /// Directory for in-flight uploads
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Maximum request body size in MiB (1-4096)
    #[arg(
        long,
        env = "MAX_UPLOAD_MB",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..=MAX_UPLOAD_MB_LIMIT)
    )]
    pub max_upload_mb: u64,

    /// Timeout for outbound HTTP calls in seconds (0 = no timeout)
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Logging verbosity level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,
}

impl AppConfig {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            upload_dir: self.upload_dir.clone(),
            max_body_bytes: usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024))
                .unwrap_or(usize::MAX),
        }
    }

    pub fn openai_config(&self) -> AzureOpenAiConfig {
        AzureOpenAiConfig {
            endpoint: self.openai_endpoint.clone(),
            api_key: self.openai_key.clone(),
            deployment: self.openai_deployment.clone(),
            api_version: self.openai_api_version.clone(),
        }
    }

    pub fn vision_config(&self) -> AzureVisionConfig {
        AzureVisionConfig::new(self.vision_endpoint.clone(), self.vision_key.clone())
    }

    pub fn cosmos_config(&self) -> CosmosConfig {
        CosmosConfig {
            endpoint: self.cosmos_endpoint.clone(),
            master_key: self.cosmos_key.clone(),
            database: self.cosmos_database.clone(),
            container: self.cosmos_container.clone(),
        }
    }

    /// Build the HTTP client shared by the outbound integrations.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if self.http_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.http_timeout_secs));
        }
        builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }

    /// Construct the recommender with live Azure-backed collaborators.
    ///
    /// # Errors
    /// Returns `ConfigError` if the HTTP client or the store client cannot be built
    pub fn build_recommender(&self) -> Result<Recommender, ConfigError> {
        let client = self.http_client()?;

        let text_tagger = AzureOpenAiTagger::new(self.openai_config(), client.clone());
        let image_tagger = AzureVisionTagger::new(self.vision_config(), client.clone());
        let store = CosmosStore::new(self.cosmos_config(), client)?;

        Ok(Recommender::new(
            Arc::new(text_tagger),
            Arc::new(image_tagger),
            Arc::new(store),
        ))
    }
}
