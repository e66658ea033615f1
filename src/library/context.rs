//! Collaborator seams and the per-request context.
//!
//! The library cache does not know where settings or folder lists come
//! from. It receives a [`SettingsProvider`] and a [`FolderProvider`] at
//! construction and asks each of them once per request through
//! [`RequestContext::capture`]. Everything downstream reads the captured
//! values, so a single request never sees two different folder lists.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::dates::DateSource;
use crate::scanner::MediaFilter;

/// Default snapshot time-to-live.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Snapshot time-to-live when slow storage mode is enabled.
pub const DEFAULT_SLOW_STORAGE_TTL: Duration = Duration::from_secs(1800);

/// Settings the library cache depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct LibrarySettings {
    /// Filesystem fallback preference
    pub date_source: DateSource,
    /// Use the longer TTL to rescan network or spinning-disk mounts less often
    pub slow_storage_mode: bool,
    /// Supported extensions and the video size limit
    pub filter: MediaFilter,
    /// Maximum snapshot age in normal mode
    pub cache_ttl: Duration,
    /// Maximum snapshot age in slow storage mode
    pub slow_storage_ttl: Duration,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            date_source: DateSource::default(),
            slow_storage_mode: false,
            filter: MediaFilter::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            slow_storage_ttl: DEFAULT_SLOW_STORAGE_TTL,
        }
    }
}

impl LibrarySettings {
    /// Set the date source.
    #[must_use]
    pub fn with_date_source(mut self, date_source: DateSource) -> Self {
        self.date_source = date_source;
        self
    }

    /// Enable or disable slow storage mode.
    #[must_use]
    pub fn with_slow_storage_mode(mut self, enabled: bool) -> Self {
        self.slow_storage_mode = enabled;
        self
    }

    /// Replace the media filter.
    #[must_use]
    pub fn with_filter(mut self, filter: MediaFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the normal-mode TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The TTL that applies under the current mode.
    #[must_use]
    pub fn effective_ttl(&self) -> Duration {
        if self.slow_storage_mode {
            self.slow_storage_ttl
        } else {
            self.cache_ttl
        }
    }
}

/// Supplies the current library settings.
pub trait SettingsProvider: Send + Sync {
    /// Current settings. Called once per request.
    fn library_settings(&self) -> LibrarySettings;
}

/// Supplies the active folder list for the current caller.
pub trait FolderProvider: Send + Sync {
    /// Configured folders, in configured order. Called once per request.
    fn active_folders(&self) -> Vec<PathBuf>;
}

impl SettingsProvider for LibrarySettings {
    fn library_settings(&self) -> LibrarySettings {
        self.clone()
    }
}

impl FolderProvider for Vec<PathBuf> {
    fn active_folders(&self) -> Vec<PathBuf> {
        self.clone()
    }
}

/// Settings and folders captured once at the start of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    settings: LibrarySettings,
    folders: Vec<PathBuf>,
}

impl RequestContext {
    /// Build a context from explicit values.
    #[must_use]
    pub fn new(settings: LibrarySettings, folders: Vec<PathBuf>) -> Self {
        Self { settings, folders }
    }

    /// Ask both providers once.
    #[must_use]
    pub fn capture(settings: &dyn SettingsProvider, folders: &dyn FolderProvider) -> Self {
        Self::new(settings.library_settings(), folders.active_folders())
    }

    /// Replace the folder list, e.g. with a profile's folder subset.
    #[must_use]
    pub fn with_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.folders = folders;
        self
    }

    /// Captured settings.
    #[must_use]
    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// Captured folder list.
    #[must_use]
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Captured date source.
    #[must_use]
    pub fn date_source(&self) -> DateSource {
        self.settings.date_source
    }
}

/// A mutable folder list shared between the owner and a library cache.
#[derive(Debug, Default)]
pub struct FolderList {
    folders: RwLock<Vec<PathBuf>>,
}

impl FolderList {
    /// Create a list with initial folders.
    #[must_use]
    pub fn new(folders: Vec<PathBuf>) -> Self {
        Self {
            folders: RwLock::new(folders),
        }
    }

    /// Replace all folders.
    pub fn set(&self, folders: Vec<PathBuf>) {
        *self.folders.write().unwrap_or_else(PoisonError::into_inner) = folders;
    }

    /// Append a folder if not already present.
    pub fn add(&self, folder: impl Into<PathBuf>) {
        let folder = folder.into();
        let mut folders = self.folders.write().unwrap_or_else(PoisonError::into_inner);
        if !folders.contains(&folder) {
            folders.push(folder);
        }
    }

    /// Remove a folder. Returns `true` if it was present.
    pub fn remove(&self, folder: &std::path::Path) -> bool {
        let mut folders = self.folders.write().unwrap_or_else(PoisonError::into_inner);
        let before = folders.len();
        folders.retain(|f| f != folder);
        folders.len() != before
    }
}

impl FolderProvider for FolderList {
    fn active_folders(&self) -> Vec<PathBuf> {
        self.folders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Settings that can be changed while a library cache is running.
#[derive(Debug, Default)]
pub struct SharedSettings {
    settings: RwLock<LibrarySettings>,
}

impl SharedSettings {
    /// Wrap initial settings.
    #[must_use]
    pub fn new(settings: LibrarySettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Apply a change in place.
    pub fn update(&self, change: impl FnOnce(&mut LibrarySettings)) {
        change(&mut self.settings.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// Change the date source.
    pub fn set_date_source(&self, date_source: DateSource) {
        self.update(|s| s.date_source = date_source);
    }
}

impl SettingsProvider for SharedSettings {
    fn library_settings(&self) -> LibrarySettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
