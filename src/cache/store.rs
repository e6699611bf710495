//! Disk-backed named response caches.
//!
//! Each cache is a directory holding the response bodies plus an
//! `index.json` mapping request URLs to body files. Caches are identified
//! by name; deleting a name removes its whole directory.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const INDEX_FILE: &str = "index.json";

/// Root directory of all named caches.
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform cache directory for this application.
    pub fn default_root() -> PathBuf {
        directories::ProjectDirs::from("", "UniTeam", "uniteam-reports")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".cache"))
    }

    /// Open a named cache, creating it when missing.
    pub fn open(&self, name: &str) -> Result<Cache> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)?;
        Cache::load(dir)
    }

    /// Names of every cache currently on disk.
    pub fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a named cache. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.root.join(name);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir)?;
        Ok(true)
    }
}

/// A cached response body.
#[derive(Debug, Clone)]
pub struct CachedBody {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct IndexEntry {
    file: String,
    content_type: Option<String>,
}

/// One named cache: an URL-keyed index over body files.
pub struct Cache {
    dir: PathBuf,
    index: BTreeMap<String, IndexEntry>,
}

impl Cache {
    fn load(dir: PathBuf) -> Result<Self> {
        let index_path = dir.join(INDEX_FILE);
        let index = if index_path.exists() {
            let content = std::fs::read_to_string(&index_path)?;
            serde_json::from_str(&content)
                .map_err(|e| AppError::cache(format!("Corrupt cache index: {e}")))?
        } else {
            BTreeMap::new()
        };

        Ok(Self { dir, index })
    }

    fn persist_index(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.index)
            .map_err(|e| AppError::cache(format!("Cannot serialize cache index: {e}")))?;
        std::fs::write(self.dir.join(INDEX_FILE), content)?;
        Ok(())
    }

    /// Store a response body under its request URL, replacing any previous
    /// entry for the same URL.
    pub fn put(&mut self, url: &str, content_type: Option<&str>, body: &[u8]) -> Result<()> {
        let file = match self.index.get(url) {
            Some(entry) => entry.file.clone(),
            None => {
                let mut n = self.index.len();
                loop {
                    let candidate = format!("entry-{n}.bin");
                    if !self.dir.join(&candidate).exists() {
                        break candidate;
                    }
                    n += 1;
                }
            }
        };

        std::fs::write(self.dir.join(&file), body)?;
        self.index.insert(
            url.to_string(),
            IndexEntry {
                file,
                content_type: content_type.map(|ct| ct.to_string()),
            },
        );
        self.persist_index()
    }

    /// Look up a cached response. With `ignore_search` the query string of
    /// both the request and the stored keys is disregarded.
    pub fn lookup(&self, url: &str, ignore_search: bool) -> Result<Option<CachedBody>> {
        let entry = if ignore_search {
            let wanted = strip_search(url);
            self.index
                .iter()
                .find(|(key, _)| strip_search(key) == wanted)
                .map(|(_, entry)| entry)
        } else {
            self.index.get(url)
        };

        let Some(entry) = entry else {
            return Ok(None);
        };

        let body = std::fs::read(self.dir.join(&entry.file))?;
        Ok(Some(CachedBody {
            body,
            content_type: entry.content_type.clone(),
        }))
    }

    /// Number of cached URLs.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Drop query string and fragment from an URL.
fn strip_search(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn temp_storage() -> CacheStorage {
        let id = TEST_ID.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "uniteam-reports-store-test-{}-{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        CacheStorage::new(root)
    }

    #[test]
    fn test_put_and_lookup() {
        let storage = temp_storage();
        let mut cache = storage.open("test-v1").unwrap();

        cache
            .put("https://example.com/index.html", Some("text/html"), b"<html>")
            .unwrap();

        let hit = cache.lookup("https://example.com/index.html", false).unwrap().unwrap();
        assert_eq!(hit.body, b"<html>");
        assert_eq!(hit.content_type.as_deref(), Some("text/html"));

        assert!(cache.lookup("https://example.com/other.html", false).unwrap().is_none());
    }

    #[test]
    fn test_lookup_ignore_search() {
        let storage = temp_storage();
        let mut cache = storage.open("test-v1").unwrap();

        cache
            .put("https://example.com/index.html", Some("text/html"), b"shell")
            .unwrap();

        // Exact match fails, ignore_search succeeds
        let url = "https://example.com/index.html?source=pwa";
        assert!(cache.lookup(url, false).unwrap().is_none());
        let hit = cache.lookup(url, true).unwrap().unwrap();
        assert_eq!(hit.body, b"shell");
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let storage = temp_storage();
        let mut cache = storage.open("test-v1").unwrap();

        cache.put("https://example.com/a", None, b"one").unwrap();
        cache.put("https://example.com/a", None, b"two").unwrap();

        assert_eq!(cache.len(), 1);
        let hit = cache.lookup("https://example.com/a", false).unwrap().unwrap();
        assert_eq!(hit.body, b"two");
    }

    #[test]
    fn test_index_persists_across_reopen() {
        let storage = temp_storage();
        {
            let mut cache = storage.open("test-v1").unwrap();
            cache.put("https://example.com/a", Some("text/plain"), b"persisted").unwrap();
        }

        let cache = storage.open("test-v1").unwrap();
        assert_eq!(cache.len(), 1);
        let hit = cache.lookup("https://example.com/a", false).unwrap().unwrap();
        assert_eq!(hit.body, b"persisted");
    }

    #[test]
    fn test_keys_and_delete() {
        let storage = temp_storage();
        storage.open("cache-v1").unwrap();
        storage.open("cache-v2").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["cache-v1".to_string(), "cache-v2".to_string()]);

        assert!(storage.delete("cache-v1").unwrap());
        assert!(!storage.delete("cache-v1").unwrap());
        assert_eq!(storage.keys().unwrap(), vec!["cache-v2".to_string()]);
    }

    #[test]
    fn test_keys_on_missing_root() {
        let storage = temp_storage();
        assert!(storage.keys().unwrap().is_empty());
    }
}
