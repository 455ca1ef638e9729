use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::ContentSource;
use crate::content::bare_id;
use crate::spool::is_listing;
use crate::store::SharedStore;

/// Pulls new content for a group into the shared store
///
/// The store lock is only taken between origin requests, never across one.
#[derive(Clone)]
pub struct Refresher {
    source: Arc<dyn ContentSource>,
    store: SharedStore,
}

/// A listing child worth a closer look
struct Candidate {
    id: String,
    num_comments: Option<u64>,
}

impl Refresher {
    pub fn new(source: Arc<dyn ContentSource>, store: SharedStore) -> Self {
        Self { source, store }
    }

    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Fetch the group listing and every new or grown thread in it
    ///
    /// Returns whether anything was merged. Origin failures are logged and
    /// reported as "no update"; the caller proceeds with what it has.
    pub async fn refresh_group(&self, group: &str) -> bool {
        let listing = match self.source.fetch_listing(group).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(group = %group, "Listing fetch failed: {}", e);
                return false;
            }
        };

        let Some(candidates) = listing_candidates(&listing) else {
            warn!(group = %group, "Listing response is not a listing");
            return false;
        };

        let stale: Vec<String> = {
            let store = self.store.lock();
            candidates
                .into_iter()
                .filter(|c| match store.spool.retrieve(&c.id) {
                    None => true,
                    Some(known) => c.num_comments > known.num_comments(),
                })
                .map(|c| c.id)
                .collect()
        };
        debug!(group = %group, threads = stale.len(), "Threads to fetch");

        for id in &stale {
            self.fetch_thread(group, id).await;
        }

        let mut guard = self.store.lock();
        let store = &mut *guard;
        let merged = store.spool.merge_listing(listing);
        let assigned = store.newsrc.renumber(group, &store.spool);
        debug!(group = %group, merged, assigned, "Refreshed group");
        true
    }

    /// Fetch one thread (post id with or without kind prefix) and merge it
    pub async fn fetch_thread(&self, group: &str, id: &str) -> bool {
        let thread = match self.source.fetch_thread(group, bare_id(id)).await {
            Ok(thread) => thread,
            Err(e) => {
                warn!(group = %group, id = %id, "Thread fetch failed: {}", e);
                return false;
            }
        };

        let mut guard = self.store.lock();
        let store = &mut *guard;
        let merged = store.spool.merge_listing(thread);
        store.newsrc.renumber(group, &store.spool);
        debug!(group = %group, id = %id, merged, "Merged thread");
        true
    }
}

/// Ids and comment counts of a listing's children, `None` if not a listing
fn listing_candidates(listing: &Value) -> Option<Vec<Candidate>> {
    if !is_listing(listing) {
        return None;
    }
    let children = listing.get("data")?.get("children")?.as_array()?;
    Some(
        children
            .iter()
            .filter_map(|child| {
                let data = child.get("data")?;
                Some(Candidate {
                    id: data.get("name")?.as_str()?.to_string(),
                    num_comments: data.get("num_comments").and_then(Value::as_u64),
                })
            })
            .collect(),
    )
}
