//! Content index ("spool")
//!
//! Every post and comment the gateway has seen, keyed by its external id and
//! stamped with the time it was stored. Entries age out after the retention
//! window; everything else about an object is left as the origin sent it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::content::{ContentKind, ContentObject};
use crate::error::StoreError;

/// A stored object plus the time it entered the index
///
/// Persisted as `{"kind": ..., "data": {...}, "timestamp": <secs>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoolEntry {
    #[serde(flatten)]
    pub object: ContentObject,
    #[serde(rename = "timestamp")]
    pub stored_at: i64,
}

/// Id-keyed table of content objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentIndex {
    entries: BTreeMap<String, SpoolEntry>,
}

/// Current wall clock in seconds
#[inline]
pub(crate) fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

impl ContentIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Direct lookup by id
    #[must_use]
    pub fn retrieve(&self, id: &str) -> Option<&ContentObject> {
        self.entries.get(id).map(|e| &e.object)
    }

    #[must_use]
    pub fn stored_at(&self, id: &str) -> Option<i64> {
        self.entries.get(id).map(|e| e.stored_at)
    }

    /// Objects in index order
    pub fn objects(&self) -> impl Iterator<Item = &ContentObject> {
        self.entries.values().map(|e| &e.object)
    }

    /// Store a post or comment, stamped with the current time
    pub fn store(&mut self, object: ContentObject) -> Result<(), StoreError> {
        self.store_at(object, now_secs())
    }

    /// Store a post or comment as of `now`
    ///
    /// Overwrites any previous copy. A comment without a title borrows the
    /// title of its post when the post is already indexed. Nested replies
    /// are detached and merged as objects of their own.
    pub fn store_at(&mut self, mut object: ContentObject, now: i64) -> Result<(), StoreError> {
        let id = object.id().ok_or(StoreError::MissingId)?.to_string();
        if !object.kind.is_article() {
            debug!(kind = %object.kind, id = %id, "Not storing non-article object");
            return Err(StoreError::UnsupportedKind {
                kind: object.kind.to_string(),
                id,
            });
        }

        if object.kind == ContentKind::Comment && object.title().is_none() {
            let title = object
                .link_id()
                .and_then(|link| self.retrieve(link))
                .and_then(ContentObject::title)
                .map(str::to_string);
            if let Some(title) = title {
                object.set_title(&title);
            }
        }

        let replies = object.take_replies();
        self.entries.insert(
            id,
            SpoolEntry {
                object,
                stored_at: now,
            },
        );

        if let Some(replies) = replies {
            self.merge_listing_at(replies, now);
        }
        Ok(())
    }

    /// Merge an origin response: an array, a listing, or a single object
    ///
    /// Returns how many objects were stored. Objects that cannot be stored
    /// (`more` stubs, accounts, malformed values) are skipped.
    pub fn merge_listing(&mut self, value: Value) -> usize {
        self.merge_listing_at(value, now_secs())
    }

    pub fn merge_listing_at(&mut self, value: Value, now: i64) -> usize {
        if is_listing(&value) {
            return listing_children(value)
                .into_iter()
                .map(|child| self.merge_listing_at(child, now))
                .sum();
        }
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.merge_listing_at(item, now))
                .sum(),
            other => {
                let stored = ContentObject::from_value(other).and_then(|o| self.store_at(o, now));
                match stored {
                    Ok(()) => 1,
                    Err(e) => {
                        debug!("Skipping object during merge: {}", e);
                        0
                    }
                }
            }
        }
    }

    /// Remove every entry older than `max_age_secs`, returns how many went
    pub fn expunge(&mut self, max_age_secs: i64) -> usize {
        self.expunge_at(now_secs(), max_age_secs)
    }

    pub fn expunge_at(&mut self, now: i64, max_age_secs: i64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.stored_at) <= max_age_secs);
        before - self.entries.len()
    }

    /// Ancestor ids of `object`, outermost first
    ///
    /// Walks `parent_id` upward until a post is reached or a parent is not
    /// indexed. The post itself is included when it is the parent reached.
    /// A broken chain simply yields the part that could be walked.
    #[must_use]
    pub fn build_references<'a>(&'a self, object: &'a ContentObject) -> Vec<&'a str> {
        let mut chain = Vec::new();
        if object.kind == ContentKind::Post {
            return chain;
        }

        let mut current = object;
        // Bounded by the index size so a parent cycle cannot spin forever
        for _ in 0..=self.entries.len() {
            let Some(parent_id) = current.parent_id() else {
                break;
            };
            chain.push(parent_id);
            match self.retrieve(parent_id) {
                Some(parent) if parent.kind != ContentKind::Post => current = parent,
                _ => break,
            }
        }
        chain.reverse();
        chain
    }
}

/// Whether `value` is a `{"kind": "Listing"}` wrapper
pub(crate) fn is_listing(value: &Value) -> bool {
    value
        .get("kind")
        .and_then(Value::as_str)
        .and_then(ContentKind::from_tag)
        == Some(ContentKind::Listing)
}

/// Children of a listing, empty when `data.children` is not an array
pub(crate) fn listing_children(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(mut data)) => match data.remove("children") {
                Some(Value::Array(children)) => children,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DAY: i64 = 86_400;
    const MAX_AGE: i64 = 14 * DAY;

    fn post(id: &str, group: &str) -> Value {
        json!({
            "kind": "t3",
            "data": {
                "name": id,
                "subreddit": group,
                "title": format!("Title of {}", id),
                "author": "op",
                "created_utc": 1_700_000_000,
                "num_comments": 0,
                "selftext": "text"
            }
        })
    }

    fn comment(id: &str, parent: &str, link: &str) -> Value {
        json!({
            "kind": "t1",
            "data": {
                "name": id,
                "parent_id": parent,
                "link_id": link,
                "subreddit": "news",
                "author": "someone",
                "created_utc": 1_700_000_100,
                "body": "reply",
                "replies": ""
            }
        })
    }

    fn obj(value: Value) -> ContentObject {
        ContentObject::from_value(value).unwrap()
    }

    #[test]
    fn test_store_and_retrieve() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_a", "news")), 100).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.retrieve("t3_a").unwrap().group(), Some("news"));
        assert_eq!(index.stored_at("t3_a"), Some(100));
        assert!(index.retrieve("t3_b").is_none());
    }

    #[test]
    fn test_store_overwrites_and_restamps() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_a", "news")), 100).unwrap();
        index.store_at(obj(post("t3_a", "news")), 200).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.stored_at("t3_a"), Some(200));
    }

    #[test]
    fn test_store_rejects_non_articles() {
        let mut index = ContentIndex::new();
        let more = obj(json!({"kind": "more", "data": {"name": "t1_more", "children": []}}));
        assert!(matches!(
            index.store_at(more, 0),
            Err(StoreError::UnsupportedKind { .. })
        ));
        let nameless = obj(json!({"kind": "t3", "data": {"title": "x"}}));
        assert!(matches!(index.store_at(nameless, 0), Err(StoreError::MissingId)));
        assert!(index.is_empty());
    }

    #[test]
    fn test_comment_title_backfill() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_a", "news")), 0).unwrap();
        index
            .store_at(obj(comment("t1_c", "t3_a", "t3_a")), 0)
            .unwrap();
        assert_eq!(index.retrieve("t1_c").unwrap().title(), Some("Title of t3_a"));
    }

    #[test]
    fn test_comment_keeps_own_title() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_a", "news")), 0).unwrap();
        let mut c = obj(comment("t1_c", "t3_a", "t3_a"));
        c.set_title("mine");
        index.store_at(c, 0).unwrap();
        assert_eq!(index.retrieve("t1_c").unwrap().title(), Some("mine"));
    }

    #[test]
    fn test_nested_replies_are_merged() {
        let mut index = ContentIndex::new();
        let mut top = comment("t1_top", "t3_a", "t3_a");
        top["data"]["replies"] = json!({
            "kind": "Listing",
            "data": {"children": [
                comment("t1_child", "t1_top", "t3_a"),
                {"kind": "more", "data": {"name": "t1_stub"}}
            ]}
        });
        index.store_at(obj(top), 0).unwrap();

        assert!(index.contains("t1_top"));
        assert!(index.contains("t1_child"));
        assert!(!index.contains("t1_stub"));
        assert!(index.retrieve("t1_top").unwrap().replies().is_none());
    }

    #[test]
    fn test_merge_listing_shapes() {
        let mut index = ContentIndex::new();
        let listing = json!({
            "kind": "Listing",
            "data": {"children": [post("t3_a", "news"), post("t3_b", "news")]}
        });
        assert_eq!(index.merge_listing_at(listing, 0), 2);

        // A thread response is an array of two listings
        let thread = json!([
            {"kind": "Listing", "data": {"children": [post("t3_c", "news")]}},
            {"kind": "Listing", "data": {"children": [comment("t1_x", "t3_c", "t3_c")]}}
        ]);
        assert_eq!(index.merge_listing_at(thread, 0), 2);
        assert_eq!(index.merge_listing_at(post("t3_d", "news"), 0), 1);
        assert_eq!(index.merge_listing_at(json!("junk"), 0), 0);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_expunge_by_age() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_old", "news")), 0).unwrap();
        index.store_at(obj(post("t3_edge", "news")), DAY).unwrap();
        index.store_at(obj(post("t3_new", "news")), 10 * DAY).unwrap();

        let now = 15 * DAY;
        assert_eq!(index.expunge_at(now, MAX_AGE), 1);
        assert!(!index.contains("t3_old"));
        // Exactly MAX_AGE old is kept
        assert!(index.contains("t3_edge"));
        assert!(index.contains("t3_new"));
    }

    #[test]
    fn test_expunge_extreme_timestamps() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_ancient", "news")), i64::MIN).unwrap();
        index.store_at(obj(post("t3_future", "news")), i64::MAX).unwrap();

        assert_eq!(index.expunge_at(15 * DAY, MAX_AGE), 1);
        assert!(!index.contains("t3_ancient"));
        assert!(index.contains("t3_future"));
    }

    #[test]
    fn test_references_walk_to_post() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_a", "news")), 0).unwrap();
        index.store_at(obj(comment("t1_1", "t3_a", "t3_a")), 0).unwrap();
        index.store_at(obj(comment("t1_2", "t1_1", "t3_a")), 0).unwrap();
        index.store_at(obj(comment("t1_3", "t1_2", "t3_a")), 0).unwrap();

        let leaf = index.retrieve("t1_3").unwrap();
        assert_eq!(index.build_references(leaf), vec!["t3_a", "t1_1", "t1_2"]);

        let top = index.retrieve("t1_1").unwrap();
        assert_eq!(index.build_references(top), vec!["t3_a"]);

        let root = index.retrieve("t3_a").unwrap();
        assert!(index.build_references(root).is_empty());
    }

    #[test]
    fn test_references_stop_at_missing_parent() {
        let mut index = ContentIndex::new();
        index.store_at(obj(comment("t1_2", "t1_gone", "t3_a")), 0).unwrap();
        let c = index.retrieve("t1_2").unwrap();
        assert_eq!(index.build_references(c), vec!["t1_gone"]);
    }

    #[test]
    fn test_references_survive_parent_cycle() {
        let mut index = ContentIndex::new();
        index.store_at(obj(comment("t1_a", "t1_b", "t3_x")), 0).unwrap();
        index.store_at(obj(comment("t1_b", "t1_a", "t3_x")), 0).unwrap();
        let c = index.retrieve("t1_a").unwrap();
        assert!(index.build_references(c).len() <= 3);
    }

    #[test]
    fn test_persisted_shape() {
        let mut index = ContentIndex::new();
        index.store_at(obj(post("t3_a", "news")), 42).unwrap();
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["t3_a"]["kind"], "t3");
        assert_eq!(value["t3_a"]["timestamp"], 42);
        assert_eq!(value["t3_a"]["data"]["name"], "t3_a");

        let back: ContentIndex = serde_json::from_value(value).unwrap();
        assert_eq!(back, index);
    }
}
