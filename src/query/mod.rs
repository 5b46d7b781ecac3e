//! Recommendation pipeline.
//!
//! This module turns one request's inputs into a [`Recommendation`]. It
//! coordinates the taggers and the destination store:
//!
//! 1. Tag the text (if any) with the [`TextTagger`]
//! 2. Tag the image (if any) with the [`ImageTagger`], keeping only the top tag
//! 3. Merge both into a deduplicated [`TagSet`]
//! 4. Query the [`DestinationStore`] with one clause per tag
//!
//! Failures from the taggers or the store never escape: a failed tagger
//! contributes no tag and a failed query yields no destinations.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use travel_recommender::query::{Recommender, RecommendRequest};
//! # use travel_recommender::{tagging::{TextTagger, ImageTagger}, storage::DestinationStore};
//! # async fn example(
//! #     text: Arc<dyn TextTagger>,
//! #     image: Arc<dyn ImageTagger>,
//! #     store: Arc<dyn DestinationStore>,
//! # ) {
//! let recommender = Recommender::new(text, image, store);
//! let outcome = recommender
//!     .recommend(RecommendRequest::new(Some("I want to relax on a beach"), None))
//!     .await;
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::models::{is_known_tag, Recommendation, TagSet};
use crate::storage::{DestinationStore, TagFilterQuery};
use crate::tagging::{ImageTagger, TextTagger};

/// Inputs of a single recommendation request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendRequest<'a> {
    /// User text, trimmed; `None` when absent or blank
    pub text: Option<&'a str>,

    /// Path to the stored upload, if an image was sent
    pub image: Option<&'a Path>,
}

impl<'a> RecommendRequest<'a> {
    /// Create a request, treating blank text as absent.
    pub fn new(text: Option<&'a str>, image: Option<&'a Path>) -> Self {
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        Self { text, image }
    }
}

/// Merge the text keyword and the image tags into a tag set.
///
/// Only the first image tag is used. Empty values are skipped and a keyword
/// that appears in both sources is kept once.
pub fn aggregate_tags(text_tag: Option<String>, image_tags: Option<Vec<String>>) -> TagSet {
    let mut tags = TagSet::new();

    if let Some(keyword) = text_tag {
        tags.insert(&keyword);
    }
    if let Some(top) = image_tags.and_then(|tags| tags.into_iter().next()) {
        tags.insert(&top);
    }

    tags
}

/// Recommendation engine with injected collaborators.
///
/// One instance is built at startup and shared by every request.
pub struct Recommender {
    /// Tagger for the free-text field
    text_tagger: Arc<dyn TextTagger>,

    /// Tagger for uploaded images
    image_tagger: Arc<dyn ImageTagger>,

    /// Store queried with the final tags
    store: Arc<dyn DestinationStore>,
}

impl Recommender {
    /// Create a new recommender.
    ///
    /// # Arguments
    /// * `text_tagger` - Derives a keyword from text
    /// * `image_tagger` - Derives ranked labels from an image
    /// * `store` - Destination store to filter by tag
    pub fn new(
        text_tagger: Arc<dyn TextTagger>,
        image_tagger: Arc<dyn ImageTagger>,
        store: Arc<dyn DestinationStore>,
    ) -> Self {
        Self {
            text_tagger,
            image_tagger,
            store,
        }
    }

    async fn text_tag(&self, text: &str) -> Option<String> {
        match self.text_tagger.keyword(text).await {
            Ok(keyword) => Some(keyword),
            Err(e) => {
                tracing::warn!(tagger = self.text_tagger.name(), error = %e, "Text tagging failed");
                None
            }
        }
    }

    async fn image_tags(&self, path: &Path) -> Option<Vec<String>> {
        match self.image_tagger.tags(path).await {
            Ok(tags) => Some(tags),
            Err(e) => {
                tracing::warn!(tagger = self.image_tagger.name(), error = %e, "Image tag detection failed");
                None
            }
        }
    }

    /// Run the pipeline for one request.
    ///
    /// Taggers run sequentially, text first. Returns
    /// [`Recommendation::NoTags`] without touching the store when no tag was
    /// derived.
    pub async fn recommend(&self, request: RecommendRequest<'_>) -> Recommendation {
        let text_tag = match request.text {
            Some(text) => self.text_tag(text).await,
            None => None,
        };
        let image_tags = match request.image {
            Some(path) => self.image_tags(path).await,
            None => None,
        };

        let tags = aggregate_tags(text_tag, image_tags);
        tracing::info!(tags = ?tags.as_slice(), "Final combined tags");
        for tag in tags.iter().filter(|tag| !is_known_tag(tag)) {
            tracing::debug!(tag, "Tag outside the prompt vocabulary");
        }

        let Some(query) = TagFilterQuery::for_tags(&tags) else {
            return Recommendation::NoTags;
        };

        let destinations = match self.store.query(&query).await {
            Ok(destinations) => destinations,
            Err(e) => {
                tracing::warn!(store = self.store.name(), error = %e, "Destination query failed");
                Vec::new()
            }
        };

        Recommendation::Suggestions {
            said: request.text.map(str::to_string),
            tags,
            destinations,
        }
    }
}
