//! Core data models for the travel recommender.
//!
//! This module contains the data structures that flow through a single
//! recommendation request: the tag set derived from user input, the
//! destination records returned by the document store, and the final
//! outcome handed to the renderer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Keywords the text tagger is instructed to choose from.
///
/// Nothing downstream enforces this list; tags outside of it are passed
/// through to the store query unchanged.
pub const TAG_VOCABULARY: &[&str] = &[
    "beach",
    "mountain",
    "temple",
    "nature",
    "hiking",
    "city",
    "culture",
    "history",
    "island",
    "adventure",
    "surfing",
];

/// Returns `true` if `tag` is one of the [`TAG_VOCABULARY`] keywords.
pub fn is_known_tag(tag: &str) -> bool {
    TAG_VOCABULARY.contains(&tag)
}

/// A travel destination as stored in the document store.
///
/// The store owns the schema; only the fields the renderer needs are
/// modelled here. `tags` is kept as raw JSON because records carry either a
/// free-text string or a list. Text fields accept any JSON value so one
/// odd record never rejects the rest of a result page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    /// Document identifier, if the store returned one
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Display name of the destination
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,

    /// Short description shown next to the name
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,

    /// Tags field matched by the filter query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
}

/// Strings as-is, `null` as nothing, any other value as its JSON text.
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

impl Destination {
    /// Create a destination with a name and description and no tags.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            tags: None,
        }
    }
}

/// Ordered, deduplicated set of lowercase tags.
///
/// Insertion order is preserved so the text-derived tag always precedes the
/// image-derived one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, ignoring empty values and duplicates.
    ///
    /// The value is trimmed and lowercased before comparison. Returns `true`
    /// if the tag was added.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    /// Comma-separated rendering used in the response page.
    pub fn joined(&self) -> String {
        self.tags.join(", ")
    }
}

/// Outcome of a single recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Neither input produced a tag; no query was issued.
    NoTags,

    /// At least one tag was derived and the store was queried.
    Suggestions {
        /// The trimmed user text, `None` for image-only requests
        said: Option<String>,

        /// Final tag set used for the query
        tags: TagSet,

        /// Matching destinations, empty when nothing matched or the query failed
        destinations: Vec<Destination>,
    },
}
