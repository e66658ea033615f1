//! The library cache service.
//!
//! # Overview
//!
//! [`LibraryCache`] answers three questions about the active folders:
//! every image newest first, the images of one directory, and the leaf
//! folder summaries. Answers come from the current [`Snapshot`] while it
//! is valid (see [`validity`]) and from a fresh scan otherwise.
//!
//! # Concurrency
//!
//! The snapshot lives behind an `RwLock<Option<Arc<Snapshot>>>`. Readers
//! clone the `Arc` and release the lock immediately; a scan replaces the
//! whole `Arc` in one write. Scans are serialized by a separate mutex and
//! re-check validity once they hold it, so a burst of concurrent misses
//! costs a single scan. [`LibraryCache::invalidate_cache`] bumps a
//! generation counter; a scan that started before the bump returns its
//! result to its own caller but never installs it.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use homefeed::cache::MetadataDateCache;
//! use homefeed::dates::DateResolver;
//! use homefeed::library::{FolderList, LibraryCache, LibrarySettings};
//!
//! let folders = Arc::new(FolderList::new(vec![PathBuf::from("/srv/photos")]));
//! let resolver = DateResolver::with_default_extractor(MetadataDateCache::in_memory());
//! let library = LibraryCache::new(Arc::new(LibrarySettings::default()), folders, resolver);
//!
//! let ctx = library.context();
//! for image in library.get_all_images(&ctx).iter().take(10) {
//!     println!("{}", image.display());
//! }
//! ```

pub mod context;
pub mod leaf;
pub mod snapshot;
pub mod validity;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::SystemTime;

pub use context::{
    FolderList, FolderProvider, LibrarySettings, RequestContext, SettingsProvider, SharedSettings,
};
pub use leaf::LeafFolder;
pub use snapshot::Snapshot;
pub use validity::{InvalidReason, Validity};

use crate::dates::DateResolver;
use crate::scanner::path_utils::resolve_folder;
use crate::scanner::{self, ScanSummary};

/// Leaf summaries together with the snapshot they were derived from.
#[derive(Debug)]
struct LeafCache {
    source: Arc<Snapshot>,
    leaves: Arc<Vec<LeafFolder>>,
}

/// Scan-result cache for one process.
pub struct LibraryCache {
    settings: Arc<dyn SettingsProvider>,
    folders: Arc<dyn FolderProvider>,
    resolver: DateResolver,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    leaves: Mutex<Option<LeafCache>>,
    scan_lock: Mutex<()>,
    scans: AtomicUsize,
    /// Bumped by every invalidation.
    generation: AtomicU64,
    last_summary: Mutex<Option<ScanSummary>>,
}

impl std::fmt::Debug for LibraryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryCache")
            .field("resolver", &self.resolver)
            .field("scans", &self.scan_count())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LibraryCache {
    /// Create an empty cache. Nothing is scanned until the first read.
    #[must_use]
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        folders: Arc<dyn FolderProvider>,
        resolver: DateResolver,
    ) -> Self {
        Self {
            settings,
            folders,
            resolver,
            snapshot: RwLock::new(None),
            leaves: Mutex::new(None),
            scan_lock: Mutex::new(()),
            scans: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            last_summary: Mutex::new(None),
        }
    }

    /// Capture settings and active folders for one request.
    #[must_use]
    pub fn context(&self) -> RequestContext {
        RequestContext::capture(self.settings.as_ref(), self.folders.as_ref())
    }

    /// The date resolver shared by all scans.
    #[must_use]
    pub fn resolver(&self) -> &DateResolver {
        &self.resolver
    }

    /// The current snapshot without any validity check.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check the current snapshot against `ctx`.
    #[must_use]
    pub fn validity(&self, ctx: &RequestContext) -> Validity {
        validity::check(self.current().as_deref(), ctx, SystemTime::now())
    }

    /// A snapshot valid for `ctx`, scanning if needed.
    pub fn snapshot(&self, ctx: &RequestContext) -> Arc<Snapshot> {
        if let Some(snapshot) = self.valid_snapshot(ctx) {
            return snapshot;
        }

        let _guard = lock(&self.scan_lock);
        // Another thread may have finished a scan while we waited.
        if let Some(snapshot) = self.valid_snapshot(ctx) {
            return snapshot;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let (snapshot, summary) = scanner::scan(ctx.folders(), ctx.settings(), &self.resolver);
        let snapshot = Arc::new(snapshot);

        {
            let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            if self.generation.load(Ordering::SeqCst) == generation {
                *slot = Some(Arc::clone(&snapshot));
                *lock(&self.leaves) = None;
            } else {
                log::debug!("Cache invalidated during scan, not installing the result");
            }
        }
        *lock(&self.last_summary) = Some(summary);
        self.scans.fetch_add(1, Ordering::SeqCst);

        snapshot
    }

    fn valid_snapshot(&self, ctx: &RequestContext) -> Option<Arc<Snapshot>> {
        let current = self.current();
        match validity::check(current.as_deref(), ctx, SystemTime::now()) {
            Validity::Valid => current,
            Validity::Invalid(reason) => {
                log::debug!("Library cache miss: {}", reason);
                None
            }
        }
    }

    /// All images, newest first.
    pub fn get_all_images(&self, ctx: &RequestContext) -> Vec<PathBuf> {
        self.snapshot(ctx).images().to_vec()
    }

    /// Images directly inside `folder`, in the same relative order as
    /// [`Self::get_all_images`]. Unknown folders yield an empty list.
    pub fn get_images_by_folder(&self, ctx: &RequestContext, folder: &Path) -> Vec<PathBuf> {
        self.snapshot(ctx)
            .images_in_folder(&resolve_folder(folder))
            .to_vec()
    }

    /// Leaf folder summaries, newest first.
    ///
    /// Summaries are cached alongside the snapshot they came from and
    /// recomputed whenever the snapshot is replaced.
    pub fn get_leaf_folders(&self, ctx: &RequestContext) -> Arc<Vec<LeafFolder>> {
        let snapshot = self.snapshot(ctx);

        let mut cached = lock(&self.leaves);
        if let Some(entry) = cached.as_ref() {
            if Arc::ptr_eq(&entry.source, &snapshot) {
                return Arc::clone(&entry.leaves);
            }
        }

        let leaves = Arc::new(leaf::aggregate(&snapshot));
        *cached = Some(LeafCache {
            source: snapshot,
            leaves: Arc::clone(&leaves),
        });
        leaves
    }

    /// Drop the snapshot and leaf summaries; the next read rescans.
    ///
    /// A scan already running when this is called does not install its
    /// result.
    pub fn invalidate_cache(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
        *lock(&self.leaves) = None;
        log::debug!("Library cache invalidated");
    }

    /// Number of full scans performed so far.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Counters from the most recent scan.
    #[must_use]
    pub fn last_summary(&self) -> Option<ScanSummary> {
        lock(&self.last_summary).clone()
    }
}
