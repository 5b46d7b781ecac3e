//! Destination store abstraction and implementations.
//!
//! This module defines the read-only interface used to look up destinations
//! by tag, together with the parameterized filter query that every backend
//! receives. The Cosmos DB backend lives in [`cosmos`].

pub mod cosmos;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Destination, TagSet};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    ConnectionError(String),

    /// The store rejected or failed the query
    #[error("Query execution failed: {0}")]
    QueryError(String),

    /// Data serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid client configuration (e.g., undecodable key)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A named value bound into a query.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryParameter {
    pub name: String,
    pub value: String,
}

/// Parameterized SQL query over the destinations collection.
///
/// Serializes to the `{ "query": ..., "parameters": [...] }` shape Cosmos DB
/// accepts.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagFilterQuery {
    pub query: String,
    pub parameters: Vec<QueryParameter>,
}

impl TagFilterQuery {
    /// Build one case-insensitive containment clause per tag, OR-combined.
    ///
    /// Tags are bound as `@tag0`, `@tag1`, ... and never appear in the query
    /// text. Returns `None` for an empty tag set, which must not be queried.
    ///
    /// # Example
    /// ```ignore
    /// // SELECT * FROM c WHERE CONTAINS(LOWER(c.tags), @tag0) OR CONTAINS(LOWER(c.tags), @tag1)
    /// let query = TagFilterQuery::for_tags(&tags).unwrap();
    /// ```
    pub fn for_tags(tags: &TagSet) -> Option<Self> {
        if tags.is_empty() {
            return None;
        }

        let (clauses, parameters): (Vec<String>, Vec<QueryParameter>) = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                let name = format!("@tag{}", i);
                let clause = format!("CONTAINS(LOWER(c.tags), {})", name);
                (
                    clause,
                    QueryParameter {
                        name,
                        value: tag.to_string(),
                    },
                )
            })
            .unzip();

        Some(Self {
            query: format!("SELECT * FROM c WHERE {}", clauses.join(" OR ")),
            parameters,
        })
    }
}

/// Trait for destination storage backends.
///
/// Implementations are shared across requests and must be safe for
/// concurrent use.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Execute a tag filter query and return every matching destination.
    ///
    /// Results are returned in store order with no limit applied.
    ///
    /// # Errors
    /// Returns `StorageError` if the query cannot be executed
    async fn query(&self, query: &TagFilterQuery) -> StorageResult<Vec<Destination>>;

    fn name(&self) -> &str;
}
