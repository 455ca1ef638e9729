//! Content objects as delivered by the origin service
//!
//! Objects keep their origin JSON shape, `{"kind": "<tag>", "data": {...}}`,
//! so nothing the renderer might want is lost in translation. The accessors
//! below name the handful of fields the gateway itself relies on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Kind tag of a content object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "Listing")]
    Listing,
    #[serde(rename = "t1")]
    Comment,
    #[serde(rename = "t2")]
    Account,
    #[serde(rename = "t3")]
    Post,
    #[serde(rename = "t4")]
    Message,
    #[serde(rename = "t5")]
    Subreddit,
    #[serde(rename = "t6")]
    Award,
    #[serde(rename = "t8")]
    Promo,
    #[serde(rename = "more")]
    More,
}

impl ContentKind {
    const TAGS: &'static [(&'static str, ContentKind)] = &[
        ("Listing", ContentKind::Listing),
        ("t1", ContentKind::Comment),
        ("t2", ContentKind::Account),
        ("t3", ContentKind::Post),
        ("t4", ContentKind::Message),
        ("t5", ContentKind::Subreddit),
        ("t6", ContentKind::Award),
        ("t8", ContentKind::Promo),
        ("more", ContentKind::More),
    ];

    /// Parse a wire tag; listings are matched case-insensitively
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::TAGS
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag))
            .map(|&(_, kind)| kind)
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        Self::TAGS
            .iter()
            .find(|(_, k)| *k == self)
            .map_or("?", |&(t, _)| t)
    }

    /// Whether objects of this kind become numbered articles
    #[inline]
    #[must_use]
    pub fn is_article(self) -> bool {
        matches!(self, Self::Post | Self::Comment)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One post, comment or other object from the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentObject {
    pub kind: ContentKind,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ContentObject {
    /// Build from an origin JSON value
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let Value::Object(mut map) = value else {
            return Err(StoreError::Malformed("not a JSON object".to_string()));
        };
        let kind = map
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Malformed("missing kind".to_string()))?;
        let kind = ContentKind::from_tag(kind)
            .ok_or_else(|| StoreError::Malformed(format!("unknown kind '{}'", kind)))?;
        let data = match map.remove("data") {
            Some(Value::Object(data)) => data,
            Some(_) => return Err(StoreError::Malformed("data is not an object".to_string())),
            None => Map::new(),
        };
        Ok(Self { kind, data })
    }

    /// String field of `data`, `None` when absent, null or not a string
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Stable external id (`data.name`, e.g. `t3_abc`)
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.str_field("name").filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.str_field("parent_id")
    }

    /// Id of the post a comment belongs to
    #[must_use]
    pub fn link_id(&self) -> Option<&str> {
        self.str_field("link_id")
    }

    /// Group (subreddit) the object was posted to
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.str_field("subreddit")
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn set_title(&mut self, title: &str) {
        self.data
            .insert("title".to_string(), Value::String(title.to_string()));
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.str_field("author")
    }

    /// Creation time in whole seconds since the epoch
    ///
    /// The origin sends fractional seconds (`1700000000.0`); both integers
    /// and floats are accepted.
    #[must_use]
    pub fn created_at(&self) -> Option<i64> {
        let value = self.data.get("created_utc")?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
    }

    #[must_use]
    pub fn num_comments(&self) -> Option<u64> {
        self.data.get("num_comments").and_then(Value::as_u64)
    }

    /// Nested reply listing, when the origin sent one
    ///
    /// Leaf comments carry `"replies": ""` instead of a listing.
    #[must_use]
    pub fn replies(&self) -> Option<&Value> {
        self.data.get("replies").filter(|v| v.is_object())
    }

    /// Detach the nested reply listing so it can be merged separately
    pub fn take_replies(&mut self) -> Option<Value> {
        if self.replies().is_some() {
            self.data.remove("replies")
        } else {
            None
        }
    }

    /// Groups of the posts this one was crossposted from
    #[must_use]
    pub fn crosspost_groups(&self) -> Vec<&str> {
        self.data
            .get("crosspost_parent_list")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|p| p.get("subreddit").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Strip a `t3_` style kind prefix from an id
#[must_use]
pub fn bare_id(id: &str) -> &str {
    match id.split_once('_') {
        Some((prefix, rest)) if prefix.len() == 2 && prefix.starts_with('t') => rest,
        _ => id,
    }
}
