//! Two-level cache for YouTube API responses
//!
//! Provides a `CacheManager` that keeps entries in an in-memory map and
//! mirrors every write to JSON files on disk. The disk copy is loaded once at
//! construction so cached channel and video data survives restarts; after
//! that, all reads are served from memory.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Filename prefix namespacing persistent cache entries.
///
/// Only files carrying this prefix are loaded at construction or removed by
/// `clear`, so the cache directory can be shared with other tools.
const PERSISTENT_PREFIX: &str = "youtube_cache_";

/// Wrapper struct for a cached value, in memory and on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached data, kept as raw JSON so entries of different resource
    /// types can share one map
    data: serde_json::Value,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Result of a fresh cache read
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
}

/// Manages the in-memory cache map and its persistent mirror
///
/// Entries do not carry their own expiry; the TTL is supplied by the reader,
/// because the same store holds resources with different freshness windows
/// (channel metadata vs. recent video lists). An entry older than the
/// supplied TTL is evicted from memory and never returned.
#[derive(Debug)]
pub struct CacheManager {
    /// In-memory entries
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Directory where the persistent mirror lives
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager using the XDG-compliant cache directory
    /// (`~/.cache/muguet/` on Linux), pre-loading any persisted entries.
    ///
    /// Returns `None` if the cache directory cannot be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "muguet")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a CacheManager with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        let manager = Self {
            entries: Mutex::new(HashMap::new()),
            cache_dir,
        };
        manager.load_persistent();
        manager
    }

    /// Returns the path to the persistent file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}{}.json", PERSISTENT_PREFIX, key))
    }

    /// Loads every persisted entry into the in-memory map.
    ///
    /// Unreadable or malformed files are skipped; they will be overwritten on
    /// the next store for their key.
    fn load_persistent(&self) {
        let Ok(dir) = fs::read_dir(&self.cache_dir) else {
            return;
        };

        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let mut loaded = 0usize;

        for file in dir.flatten() {
            let name = file.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(key) = name
                .strip_prefix(PERSISTENT_PREFIX)
                .and_then(|rest| rest.strip_suffix(".json"))
            else {
                continue;
            };

            let Ok(content) = fs::read_to_string(file.path()) else {
                continue;
            };
            match serde_json::from_str::<CacheEntry>(&content) {
                Ok(entry) => {
                    entries.insert(key.to_string(), entry);
                    loaded += 1;
                }
                Err(e) => warn!(key, error = %e, "skipping malformed cache file"),
            }
        }

        if loaded > 0 {
            debug!(loaded, "loaded persistent cache entries");
        }
    }

    /// Reads a cache entry, enforcing the supplied TTL
    ///
    /// # Arguments
    /// * `key` - The cache key to read (e.g., "channel_mine")
    /// * `ttl` - How long after `cached_at` the entry is still valid
    ///
    /// # Returns
    /// * `Some(CachedData<T>)` if a fresh entry exists and deserializes
    /// * `None` if the entry is missing, expired, or of the wrong shape
    ///
    /// Expired entries are removed from the in-memory map before returning,
    /// so a stale value is never served.
    pub fn read<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<CachedData<T>> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        let entry = entries.get(key)?;
        if Utc::now() - entry.cached_at >= ttl {
            debug!(key, "cache entry expired");
            entries.remove(key);
            return None;
        }

        let cached_at = entry.cached_at;
        let data = serde_json::from_value(entry.data.clone()).ok()?;
        debug!(key, "cache hit");
        Some(CachedData { data, cached_at })
    }

    /// Writes a value under the given key, in memory and on disk
    ///
    /// The persistent write is best-effort from the caller's point of view: a
    /// full disk or read-only directory degrades the cache to memory-only for
    /// that entry.
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> std::io::Result<()> {
        let entry = CacheEntry {
            data: serde_json::to_value(data)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
            cached_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), entry);

        fs::create_dir_all(&self.cache_dir)?;
        fs::write(self.cache_path(key), json)
    }

    /// Clears the in-memory map and removes every persisted entry
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();

        let Ok(dir) = fs::read_dir(&self.cache_dir) else {
            return;
        };
        for file in dir.flatten() {
            let name = file.file_name();
            if name
                .to_str()
                .is_some_and(|n| n.starts_with(PERSISTENT_PREFIX))
            {
                if let Err(e) = fs::remove_file(file.path()) {
                    warn!(error = %e, "failed to remove cache file");
                }
            }
        }
        debug!("cache cleared");
    }

    /// Number of entries currently held in memory
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    /// Whether the in-memory map is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
