//! Travel Recommender - destination suggestions from a description or a photo.
//!
//! This library provides the core of the Travel Bot service, which turns free
//! text and/or an uploaded image into a handful of keyword tags and uses them
//! to filter destination records held in a document store.
//!
//! # Architecture
//!
//! - **models**: Core data structures (Destination, TagSet, Recommendation)
//! - **tagging**: Text and image taggers backed by hosted inference services
//! - **storage**: Destination store abstraction and the Cosmos DB client
//! - **query**: The recommendation pipeline and tag aggregation
//! - **server**: HTTP routes, multipart intake and HTML rendering
//! - **config**: Command-line / environment configuration
//!
//! # Request Flow
//!
//! 1. Receive `text` and/or `image` on `POST /recommend`
//! 2. Ask the completion service for one keyword describing the text
//! 3. Ask the vision service for labels of the image, keep the top one
//! 4. Merge both into a deduplicated tag set
//! 5. Query the store for destinations whose tags contain any of them
//! 6. Render the matches as HTML
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use travel_recommender::{
//!     config::AppConfig,
//!     server::TravelServer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::parse();
//!     let recommender = Arc::new(config.build_recommender()?);
//!     TravelServer::new(config.server_config(), recommender).run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod models;
pub mod query;
pub mod server;
pub mod storage;
pub mod tagging;

// Re-export commonly used types at the crate root
pub use models::{Destination, Recommendation, TagSet, TAG_VOCABULARY};
pub use query::{aggregate_tags, RecommendRequest, Recommender};
pub use storage::{DestinationStore, TagFilterQuery};
pub use tagging::{ImageTagger, TextTagger};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
