//! Date cache key and lookup result.

use std::fmt;
use std::path::Path;

/// Composite key `"<path>:<truncated-mtime>:<size>"`.
///
/// Editing a file changes its mtime or size and therefore its key, so an
/// entry never needs updating once written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateCacheKey(String);

impl DateCacheKey {
    /// Build the key for a file. The mtime is truncated toward zero.
    ///
    /// Non-UTF-8 bytes in `path` are replaced lossily, so two such paths
    /// can share a key. Use [`DateCacheKey::try_new`] where that matters.
    ///
    /// # Example
    ///
    /// ```
    /// use homefeed::cache::DateCacheKey;
    /// use std::path::Path;
    ///
    /// let key = DateCacheKey::new(Path::new("/p/a.jpg"), 1700000000.75, 2048);
    /// assert_eq!(key.as_str(), "/p/a.jpg:1700000000:2048");
    /// ```
    #[must_use]
    pub fn new(path: &Path, mtime: f64, size: u64) -> Self {
        Self(format!(
            "{}:{}:{}",
            path.to_string_lossy(),
            mtime.trunc() as i64,
            size
        ))
    }

    /// Like [`DateCacheKey::new`], but `None` for paths that are not valid
    /// UTF-8 and so have no unambiguous key.
    #[must_use]
    pub fn try_new(path: &Path, mtime: f64, size: u64) -> Option<Self> {
        path.to_str().map(|_| Self::new(path, mtime, size))
    }

    /// The raw key string as stored on disk.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DateCacheKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Result of looking a key up in the date cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheLookup {
    /// An embedded date was found earlier.
    Date(f64),
    /// The file was checked earlier and has no usable embedded date.
    NoDate,
    /// The file has not been checked yet.
    Unknown,
}

impl From<Option<&Option<f64>>> for CacheLookup {
    fn from(stored: Option<&Option<f64>>) -> Self {
        match stored {
            Some(Some(ts)) => Self::Date(*ts),
            Some(None) => Self::NoDate,
            None => Self::Unknown,
        }
    }
}
