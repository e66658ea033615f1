//! Effective date resolver: date cache, extractor, filesystem fallback.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::{CacheLookup, CacheResult, DateCacheKey, MetadataDateCache};
use crate::scanner::{FileEntry, MediaKind};

use super::{default_extractor, fallback_date, DateExtractor, DateSource};

/// Where a resolved date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrigin {
    /// Embedded date served from the date cache; the file was not opened.
    CachedMetadata,
    /// Embedded date read from the file just now.
    ExtractedMetadata,
    /// Filesystem timestamp (or 0.0 if none was available).
    Filesystem,
}

/// Outcome of resolving one file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDate {
    /// Effective date, Unix seconds.
    pub timestamp: f64,
    /// Source of `timestamp`.
    pub origin: DateOrigin,
    /// Whether the date cache already knew this file.
    pub cache_hit: bool,
    /// Whether the file content was opened to look for metadata.
    pub read_metadata: bool,
}

impl ResolvedDate {
    fn filesystem(
        entry: &FileEntry,
        source: DateSource,
        cache_hit: bool,
        read_metadata: bool,
    ) -> Self {
        Self {
            timestamp: fallback_date(source, entry.mtime, entry.ctime),
            origin: DateOrigin::Filesystem,
            cache_hit,
            read_metadata,
        }
    }
}

/// Resolves effective dates, consulting the date cache before touching a
/// file.
///
/// The cache sits behind a mutex so a resolver can be shared by reference;
/// scans hold it only for the duration of one lookup or insert.
pub struct DateResolver {
    cache: Mutex<MetadataDateCache>,
    extractor: Box<dyn DateExtractor>,
    /// Cached once: an unavailable backend stays unavailable.
    extraction_enabled: bool,
}

impl fmt::Debug for DateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateResolver")
            .field("cache", &self.cache)
            .field("extractor", &"<extractor>")
            .field("extraction_enabled", &self.extraction_enabled)
            .finish()
    }
}

impl DateResolver {
    /// Create a resolver from a loaded cache and an extractor.
    #[must_use]
    pub fn new(cache: MetadataDateCache, extractor: Box<dyn DateExtractor>) -> Self {
        let extraction_enabled = extractor.is_available();
        if !extraction_enabled {
            log::info!("Embedded date extraction unavailable, using filesystem dates only");
        }
        Self {
            cache: Mutex::new(cache),
            extractor,
            extraction_enabled,
        }
    }

    /// Create a resolver with the best extractor compiled into this build.
    #[must_use]
    pub fn with_default_extractor(cache: MetadataDateCache) -> Self {
        Self::new(cache, default_extractor())
    }

    fn cache(&self) -> MutexGuard<'_, MetadataDateCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the effective date of one file from its pre-fetched stat.
    ///
    /// Never fails: any extraction problem is recorded as "no embedded
    /// date" and the filesystem fallback is used.
    pub fn resolve(&self, entry: &FileEntry, source: DateSource) -> ResolvedDate {
        if entry.kind == MediaKind::Video {
            return ResolvedDate::filesystem(entry, source, false, false);
        }

        let Some(key) = DateCacheKey::try_new(&entry.path, entry.mtime, entry.size) else {
            log::trace!("Not caching date for non-UTF-8 path {}", entry.path.display());
            let (embedded, read_metadata) = self.extract(entry);
            return Self::resolved(entry, source, embedded, read_metadata);
        };
        match self.cache().get(&key) {
            CacheLookup::Date(timestamp) => {
                return ResolvedDate {
                    timestamp,
                    origin: DateOrigin::CachedMetadata,
                    cache_hit: true,
                    read_metadata: false,
                }
            }
            CacheLookup::NoDate => return ResolvedDate::filesystem(entry, source, true, false),
            CacheLookup::Unknown => {}
        }

        let (embedded, read_metadata) = self.extract(entry);
        self.cache().put(key, embedded);
        Self::resolved(entry, source, embedded, read_metadata)
    }

    /// Embedded date, and whether the file was opened to look for it.
    fn extract(&self, entry: &FileEntry) -> (Option<f64>, bool) {
        if !self.extraction_enabled {
            return (None, false);
        }
        // Every extraction failure means the same thing: no usable date.
        match self.extractor.extract(&entry.path) {
            Ok(ts) => (Some(ts), true),
            Err(e) => {
                log::trace!("No embedded date: {}", e);
                (None, true)
            }
        }
    }

    fn resolved(
        entry: &FileEntry,
        source: DateSource,
        embedded: Option<f64>,
        read_metadata: bool,
    ) -> ResolvedDate {
        match embedded {
            Some(timestamp) => ResolvedDate {
                timestamp,
                origin: DateOrigin::ExtractedMetadata,
                cache_hit: false,
                read_metadata,
            },
            None => ResolvedDate::filesystem(entry, source, false, read_metadata),
        }
    }

    /// Persist new cache entries, if any.
    pub fn flush(&self) -> CacheResult<bool> {
        self.cache().flush()
    }

    /// Number of keys in the date cache.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache().len()
    }

    /// Whether the date cache has unflushed entries.
    #[must_use]
    pub fn cache_is_dirty(&self) -> bool {
        self.cache().is_dirty()
    }
}
