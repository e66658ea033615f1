//! Persistent metadata date cache.
//!
//! Reading an embedded capture date means opening the file. This module
//! remembers the outcome per unchanged file so that each photo is opened at
//! most once across scans and process restarts.
//!
//! # Architecture
//!
//! * [`entry`]: the composite key and the three-way lookup result.
//! * [`store`]: the in-memory mapping plus JSON load/flush.
//!
//! # Cache Invalidation
//!
//! There is none. Entries are keyed by:
//! * File path
//! * Modification time (truncated to whole seconds)
//! * File size
//!
//! Editing a file produces a new key; the old key simply goes unused. The
//! mapping grows monotonically, which is acceptable because keys only
//! churn on real edits.

pub mod entry;
pub mod store;

pub use entry::{CacheLookup, DateCacheKey};
pub use store::{CacheError, CacheResult, MetadataDateCache};

/// File name of the date cache inside the platform cache directory.
pub const DATE_CACHE_FILE_NAME: &str = "exif_date_cache.json";
