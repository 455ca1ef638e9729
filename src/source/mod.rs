//! Origin content retrieval
//!
//! - [`ContentSource`]: async trait for fetching raw origin JSON
//! - [`RedditSource`]: reqwest-based implementation
//! - [`Refresher`]: merges fetched content into the shared store and
//!   renumbers the affected group

mod reddit;
mod refresh;

pub use reddit::{RedditSource, is_valid_group, listing_url, thread_url};
pub use refresh::Refresher;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

/// Something that can deliver origin JSON for a group
///
/// Implementations only fetch; merging and numbering happen in
/// [`Refresher`], so tests can substitute a scripted source.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// The group's front listing (`{"kind": "Listing", "data": {"children": [...]}}`)
    async fn fetch_listing(&self, group: &str) -> Result<Value, FetchError>;

    /// One thread: the post and its comment tree, `id` without kind prefix
    async fn fetch_thread(&self, group: &str, id: &str) -> Result<Value, FetchError>;
}
