//! Tagger abstractions and implementations.
//!
//! This module defines the interfaces that turn raw user input into keyword
//! tags and provides implementations backed by hosted inference services:
//!
//! - [`TextTagger`]: free text to a single keyword (Azure OpenAI chat completions)
//! - [`ImageTagger`]: stored image bytes to a ranked list of labels (Azure Computer Vision)
//!
//! Both traits return explicit [`TaggingResult`]s. Deciding that a failed call
//! simply means "no tag from this source" is the caller's job.

pub mod openai;
pub mod vision;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while deriving tags.
#[derive(Debug, Error)]
pub enum TaggingError {
    /// Network or transport failure
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The service answered with a non-success status
    #[error("Service returned {status}: {body}")]
    ServiceError { status: u16, body: String },

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The input could not be read or was unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for TaggingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TaggingError::MalformedResponse(err.to_string())
        } else {
            TaggingError::RequestError(err.to_string())
        }
    }
}

/// Result type for tagging operations.
pub type TaggingResult<T> = Result<T, TaggingError>;

/// Derives a single keyword from free text.
#[async_trait]
pub trait TextTagger: Send + Sync {
    /// Extract one keyword describing the kind of destination the text asks for.
    ///
    /// # Arguments
    /// * `text` - Non-empty, already trimmed user text
    ///
    /// # Returns
    /// A lowercase keyword. An empty string means the service answered but
    /// produced nothing usable.
    ///
    /// # Errors
    /// Returns `TaggingError` if the service call fails
    async fn keyword(&self, text: &str) -> TaggingResult<String>;

    /// Human-readable name used in log lines.
    fn name(&self) -> &str;
}

/// Derives descriptive labels from an image stored on local disk.
#[async_trait]
pub trait ImageTagger: Send + Sync {
    /// Tag the image at `path`.
    ///
    /// # Returns
    /// Lowercase tag names in the order the service ranked them
    ///
    /// # Errors
    /// Returns `TaggingError` if the file cannot be read or the call fails
    async fn tags(&self, path: &Path) -> TaggingResult<Vec<String>>;

    fn name(&self) -> &str;
}

/// Normalizes a completion into a keyword: first line, trimmed, lowercased.
///
/// # Example
/// ```ignore
/// assert_eq!(normalize_keyword("  Beach\nbecause sand"), "beach");
/// ```
pub fn normalize_keyword(completion: &str) -> String {
    completion
        .trim()
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Joins a service base URL and a relative path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
