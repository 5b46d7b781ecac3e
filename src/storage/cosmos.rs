//! Cosmos DB storage implementation.
//!
//! This module provides a `DestinationStore` backed by the Cosmos DB SQL REST
//! API. Requests are authorized with a master-key token and query results
//! are fetched page by page until the continuation header runs out.
//!
//! # Authorization
//! Each request carries a token computed as
//! `HMAC-SHA256(key, "{verb}\n{resource_type}\n{resource_link}\n{date}\n\n")`
//! with the verb, resource type and date lowercased, base64-encoded and
//! URL-encoded into `type=master&ver=1.0&sig=...`.

use super::{DestinationStore, StorageError, StorageResult, TagFilterQuery};
use crate::models::Destination;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// REST API version sent in `x-ms-version`.
pub const API_VERSION: &str = "2018-12-31";

/// Default database name.
pub const DEFAULT_DATABASE: &str = "travelDB";

/// Default container name.
pub const DEFAULT_CONTAINER: &str = "destinations";

const CONTINUATION_HEADER: &str = "x-ms-continuation";

/// Connection settings for a Cosmos DB account.
#[derive(Debug, Clone)]
pub struct CosmosConfig {
    /// Account endpoint, e.g. `https://my-account.documents.azure.com:443/`
    pub endpoint: String,

    /// Base64-encoded primary or secondary master key
    pub master_key: String,

    /// Database id
    pub database: String,

    /// Container (collection) id
    pub container: String,
}

impl CosmosConfig {
    /// Create a configuration pointing at the default database and container.
    pub fn new(endpoint: impl Into<String>, master_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            master_key: master_key.into(),
            database: DEFAULT_DATABASE.to_string(),
            container: DEFAULT_CONTAINER.to_string(),
        }
    }

    /// Resource link of the container, as used in the signature.
    pub fn collection_link(&self) -> String {
        format!("dbs/{}/colls/{}", self.database, self.container)
    }

    /// URL of the container's document feed.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/{}/docs",
            self.endpoint.trim_end_matches('/'),
            self.collection_link()
        )
    }
}

/// One page of a query response.
#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(rename = "Documents", default)]
    documents: Vec<Destination>,
}

/// Compute the master-key authorization header value.
///
/// # Arguments
/// * `key` - Decoded master key bytes
/// * `verb` - HTTP verb (e.g. `POST`)
/// * `resource_type` - Resource type (e.g. `docs`)
/// * `resource_link` - Parent resource link (e.g. `dbs/db/colls/coll`)
/// * `date` - The exact value sent in `x-ms-date`
pub fn authorization_token(
    key: &[u8],
    verb: &str,
    resource_type: &str,
    resource_link: &str,
    date: &str,
) -> StorageResult<String> {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        date.to_lowercase()
    );

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StorageError::ConfigError(format!("invalid master key: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(urlencoding::encode(&format!("type=master&ver=1.0&sig={}", signature)).into_owned())
}

/// RFC 1123 timestamp in the form Cosmos DB expects for `x-ms-date`.
fn rfc1123_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Cosmos DB-backed destination store.
///
/// Holds the decoded master key and a shared HTTP client; safe to share
/// across requests.
#[derive(Debug, Clone)]
pub struct CosmosStore {
    config: CosmosConfig,
    key: Vec<u8>,
    client: reqwest::Client,
}

impl CosmosStore {
    /// Create a new store client.
    ///
    /// # Errors
    /// Returns `StorageError::ConfigError` if the master key is not valid base64
    pub fn new(config: CosmosConfig, client: reqwest::Client) -> StorageResult<Self> {
        let key = STANDARD
            .decode(config.master_key.trim())
            .map_err(|e| StorageError::ConfigError(format!("master key is not base64: {}", e)))?;

        Ok(Self {
            config,
            key,
            client,
        })
    }
}

#[async_trait]
impl DestinationStore for CosmosStore {
    async fn query(&self, query: &TagFilterQuery) -> StorageResult<Vec<Destination>> {
        let body = serde_json::to_vec(query)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let url = self.config.documents_url();
        let link = self.config.collection_link();

        let mut destinations = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let date = rfc1123_now();
            let token = authorization_token(&self.key, "POST", "docs", &link, &date)?;

            let mut request = self
                .client
                .post(&url)
                .header("authorization", token)
                .header("x-ms-date", &date)
                .header("x-ms-version", API_VERSION)
                .header("x-ms-documentdb-isquery", "True")
                .header("x-ms-documentdb-query-enablecrosspartition", "True")
                .header("Content-Type", "application/query+json")
                .body(body.clone());
            if let Some(token) = &continuation {
                request = request.header(CONTINUATION_HEADER, token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StorageError::ConnectionError(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(StorageError::QueryError(format!("{}: {}", status, text)));
            }

            continuation = response
                .headers()
                .get(CONTINUATION_HEADER)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_string);

            let page: QueryPage = response
                .json()
                .await
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            destinations.extend(page.documents);
            pages += 1;

            if continuation.is_none() {
                break;
            }
        }

        tracing::debug!(pages, count = destinations.len(), "Cosmos query complete");
        Ok(destinations)
    }

    fn name(&self) -> &str {
        "cosmos"
    }
}
