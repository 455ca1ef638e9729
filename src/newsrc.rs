//! Group index ("newsrc")
//!
//! Per-group article numbering. Numbers are handed out in discovery order,
//! one past the current high watermark, and are never reused: an id keeps
//! its number for as long as the index exists, even after the content
//! index has expunged the object.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::spool::ContentIndex;

/// Article numbers of one group, indexed both ways
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct GroupMap {
    by_id: HashMap<String, u64>,
    by_number: BTreeMap<u64, String>,
}

impl From<BTreeMap<String, u64>> for GroupMap {
    fn from(map: BTreeMap<String, u64>) -> Self {
        let mut group = Self::default();
        for (id, number) in map {
            // A hand-edited file could repeat a number; first one wins
            if number == 0 || group.by_number.contains_key(&number) {
                continue;
            }
            group.by_number.insert(number, id.clone());
            group.by_id.insert(id, number);
        }
        group
    }
}

impl From<GroupMap> for BTreeMap<String, u64> {
    fn from(group: GroupMap) -> Self {
        group.by_id.into_iter().collect()
    }
}

impl GroupMap {
    /// Number of assigned articles
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.by_number.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Lowest assigned number, 0 when empty
    #[must_use]
    pub fn low(&self) -> u64 {
        self.by_number.keys().next().copied().unwrap_or(0)
    }

    /// Highest assigned number, 0 when empty
    #[must_use]
    pub fn high(&self) -> u64 {
        self.by_number.keys().next_back().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn number_of(&self, id: &str) -> Option<u64> {
        self.by_id.get(id).copied()
    }

    #[must_use]
    pub fn id_of(&self, number: u64) -> Option<&str> {
        self.by_number.get(&number).map(String::as_str)
    }

    /// Assigned numbers within `range`, ascending; empty if `range` is reversed
    pub fn articles_in(&self, range: RangeInclusive<u64>) -> impl Iterator<Item = (u64, &str)> {
        (range.start() <= range.end())
            .then(|| self.by_number.range(range))
            .into_iter()
            .flatten()
            .map(|(&number, id)| (number, id.as_str()))
    }

    /// All assigned numbers, ascending
    pub fn numbers(&self) -> impl Iterator<Item = u64> + '_ {
        self.by_number.keys().copied()
    }

    /// Number for `id`, assigning `high + 1` if it has none yet
    pub fn assign(&mut self, id: &str) -> u64 {
        if let Some(number) = self.number_of(id) {
            return number;
        }
        let number = self.high() + 1;
        self.by_number.insert(number, id.to_string());
        self.by_id.insert(id.to_string(), number);
        number
    }
}

/// Article numbering for every group the gateway has served
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupIndex {
    groups: BTreeMap<String, GroupMap>,
}

impl GroupIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupMap> {
        self.groups.get(name)
    }

    /// Known groups in name order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupMap)> {
        self.groups.iter().map(|(name, map)| (name.as_str(), map))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number every indexed object of `group` that has no number yet
    ///
    /// Creates the group on first use. Numbers are assigned in index
    /// iteration order, not by creation time. Returns how many numbers
    /// were handed out.
    pub fn renumber(&mut self, group: &str, index: &ContentIndex) -> usize {
        let map = self.groups.entry(group.to_string()).or_default();
        let mut assigned = 0;
        for object in index.objects() {
            if object.group() != Some(group) || !object.kind.is_article() {
                continue;
            }
            let Some(id) = object.id() else { continue };
            if map.number_of(id).is_none() {
                map.assign(id);
                assigned += 1;
            }
        }
        assigned
    }
}
