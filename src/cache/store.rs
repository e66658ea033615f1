//! JSON-backed persistent store for embedded capture dates.
//!
//! The file is a flat JSON object:
//!
//! ```json
//! {"/photos/a.jpg:1700000000:2048": 1699999000.0, "/photos/b.png:1700000100:512": null}
//! ```
//!
//! A number is a found capture date, `null` a confirmed absence.
//!
//! Every worker process keeps its own in-memory copy. Because the mapping is
//! purely additive and every worker computes the same value for the same
//! key, [`MetadataDateCache::flush`] merges whatever is already on disk into
//! memory before writing, then replaces the file atomically. Concurrent
//! writers can at worst drop each other's newest entries, which are
//! relearned on the next scan.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::entry::{CacheLookup, DateCacheKey};

/// Errors raised by date cache file I/O.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("Date cache I/O error for {path}: {source}")]
    Io {
        /// Cache file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not a valid JSON date mapping.
    #[error("Date cache {path} is corrupt: {source}")]
    Parse {
        /// Cache file
        path: PathBuf,
        /// The JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The temporary file could not be moved over the cache file.
    #[error("Failed to replace date cache {path}: {source}")]
    Persist {
        /// Cache file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for date cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

type DateMap = HashMap<String, Option<f64>>;

/// Persistent `(path, mtime, size) -> capture date | none` mapping.
#[derive(Debug, Default)]
pub struct MetadataDateCache {
    /// Backing file; `None` keeps the cache in memory only.
    path: Option<PathBuf>,
    entries: DateMap,
    /// Entries were added since the last successful flush.
    dirty: bool,
}

impl MetadataDateCache {
    /// Load the cache from `path`.
    ///
    /// A missing file yields an empty cache. A corrupt or unreadable file
    /// is logged and also yields an empty cache; it will be overwritten on
    /// the next flush.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(Some(entries)) => {
                log::debug!(
                    "Loaded {} date cache entries from {}",
                    entries.len(),
                    path.display()
                );
                entries
            }
            Ok(None) => {
                log::debug!("No date cache at {}, starting empty", path.display());
                DateMap::new()
            }
            Err(e) => {
                log::warn!("Could not load date cache (will rebuild): {}", e);
                DateMap::new()
            }
        };

        Self {
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    /// A cache that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of known keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether entries were added since the last flush.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Look a key up in memory.
    #[must_use]
    pub fn get(&self, key: &DateCacheKey) -> CacheLookup {
        CacheLookup::from(self.entries.get(key.as_str()))
    }

    /// Record the outcome for a key. Existing keys are never overwritten.
    ///
    /// Returns `true` if the key was new.
    pub fn put(&mut self, key: DateCacheKey, value: Option<f64>) -> bool {
        use std::collections::hash_map::Entry;

        match self.entries.entry(key.as_str().to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                self.dirty = true;
                true
            }
        }
    }

    /// Write the cache to disk if entries were added since the last flush.
    ///
    /// Returns `Ok(true)` if a write happened. On error the dirty flag stays
    /// set so a later flush retries.
    pub fn flush(&mut self) -> CacheResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let Some(path) = self.path.clone() else {
            self.dirty = false;
            return Ok(false);
        };

        // Pick up what other workers learned since we loaded.
        match read_entries(&path) {
            Ok(Some(on_disk)) => {
                let before = self.entries.len();
                for (key, value) in on_disk {
                    self.entries.entry(key).or_insert(value);
                }
                let merged = self.entries.len() - before;
                if merged > 0 {
                    log::debug!("Merged {} date cache entries written by other workers", merged);
                }
            }
            Ok(None) => {}
            Err(e) => log::debug!("Ignoring unreadable date cache during flush: {}", e),
        }

        write_entries(&path, &self.entries)?;
        self.dirty = false;
        log::debug!(
            "Saved date cache ({} entries) to {}",
            self.entries.len(),
            path.display()
        );
        Ok(true)
    }
}

/// Read the mapping; `Ok(None)` when the file does not exist.
fn read_entries(path: &Path) -> CacheResult<Option<DateMap>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| CacheError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the mapping through a sibling temp file and an atomic rename.
fn write_entries(path: &Path, entries: &DateMap) -> CacheResult<()> {
    let io_err = |source: std::io::Error| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(io_err)?;

    let json = serde_json::to_vec(entries).map_err(|source| CacheError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(io_err)?;
    tmp.write_all(&json).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| CacheError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
