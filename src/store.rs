//! Persisted gateway state
//!
//! The content index and the group index live together behind one mutex.
//! Any worker may run a mutating command, so every access goes through
//! [`SharedStore::lock`]; the lock is never held across an origin request.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::SpoolConfig;
use crate::error::StoreError;
use crate::newsrc::GroupIndex;
use crate::spool::ContentIndex;

/// Both indices plus where they are persisted
#[derive(Debug)]
pub struct Store {
    pub spool: ContentIndex,
    pub newsrc: GroupIndex,
    spool_path: PathBuf,
    newsrc_path: PathBuf,
    max_age_secs: i64,
}

impl Store {
    /// Empty store that persists to the configured paths
    #[must_use]
    pub fn new(config: &SpoolConfig) -> Self {
        Self {
            spool: ContentIndex::new(),
            newsrc: GroupIndex::new(),
            spool_path: config.spool_path.clone(),
            newsrc_path: config.newsrc_path.clone(),
            max_age_secs: config.max_age_secs(),
        }
    }

    /// Load both indices; missing or unreadable files start empty
    #[must_use]
    pub fn load(config: &SpoolConfig) -> Self {
        let mut store = Self::new(config);
        store.spool = load_or_default(&store.spool_path, "spool");
        store.newsrc = load_or_default(&store.newsrc_path, "newsrc");
        info!(
            objects = store.spool.len(),
            groups = store.newsrc.len(),
            "Loaded persisted state"
        );
        store
    }

    /// Drop content older than the retention window
    pub fn expunge(&mut self) -> usize {
        let removed = self.spool.expunge(self.max_age_secs);
        if removed > 0 {
            debug!(removed, "Expunged aged content");
        }
        removed
    }

    /// Rewrite both files
    pub fn persist(&self) -> Result<(), StoreError> {
        write_atomic(&self.spool_path, &self.spool)?;
        write_atomic(&self.newsrc_path, &self.newsrc)
    }

    /// Expunge then persist, logging instead of failing
    pub fn expunge_and_persist(&mut self) {
        self.expunge();
        if let Err(e) = self.persist() {
            warn!("Failed to persist state: {}", e);
        }
    }

    #[must_use]
    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No {} file yet, starting empty", what);
            return T::default();
        }
        Err(e) => {
            warn!(path = %path.display(), "Cannot read {} file, starting empty: {}", what, e);
            return T::default();
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|e| {
        warn!(path = %path.display(), "Corrupt {} file, starting empty: {}", what, e);
        T::default()
    })
}

/// Write JSON to a sibling temp file, then rename it over `path`
fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let encoded = serde_json::to_vec(value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, &encoded)
        .and_then(|()| std::fs::rename(&tmp, path))
        .map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Store shared by every worker
#[derive(Debug, Clone)]
pub struct SharedStore(Arc<Mutex<Store>>);

impl SharedStore {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    /// Lock the store
    ///
    /// A panic while holding the lock leaves plain data behind, so a
    /// poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, Store> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentObject;
    use serde_json::json;

    fn config_in(dir: &Path) -> SpoolConfig {
        SpoolConfig {
            spool_path: dir.join("spool"),
            newsrc_path: dir.join("newsrc"),
            max_age_days: 14,
        }
    }

    #[test]
    fn test_load_missing_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(&config_in(dir.path()));
        assert!(store.spool.is_empty());
        assert!(store.newsrc.is_empty());
    }

    #[test]
    fn test_load_corrupt_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(&config.spool_path, b"{not json").unwrap();
        std::fs::write(&config.newsrc_path, b"[1,2,3]").unwrap();

        let store = Store::load(&config);
        assert!(store.spool.is_empty());
        assert!(store.newsrc.is_empty());
    }

    #[test]
    fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let mut store = Store::new(&config);
        let post = ContentObject::from_value(json!({
            "kind": "t3",
            "data": {"name": "t3_a", "subreddit": "news"}
        }))
        .unwrap();
        store.spool.store(post).unwrap();
        store.newsrc.renumber("news", &store.spool);
        store.persist().unwrap();

        assert!(!dir.path().join("spool.tmp").exists());

        let loaded = Store::load(&config);
        assert!(loaded.spool.contains("t3_a"));
        assert_eq!(loaded.newsrc.group("news").unwrap().number_of("t3_a"), Some(1));
    }

    #[test]
    fn test_persist_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir.path().join("nope"));
        let err = Store::new(&config).persist().unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[test]
    fn test_shared_store_lock() {
        let dir = tempfile::tempdir().unwrap();
        let shared = SharedStore::new(Store::new(&config_in(dir.path())));
        let clone = shared.clone();
        clone.lock().newsrc.renumber("g", &ContentIndex::new());
        assert_eq!(shared.lock().newsrc.len(), 1);
    }
}
