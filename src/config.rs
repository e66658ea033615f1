//! Layered application configuration.
//!
//! Values are merged with `figment`, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`<platform config dir>/config.toml` unless `--config` is given)
//! 3. Environment variables prefixed `HOMEFEED_` (nested keys split on `__`)
//! 4. Command-line flags (applied by the binary after loading)
//!
//! # Example
//!
//! ```toml
//! folders = ["~/Pictures", "/mnt/nas/photos"]
//! date_source = "ctime"
//! slow_storage_mode = true
//! max_video_size = 1073741824
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cache::DATE_CACHE_FILE_NAME;
use crate::cli::ScanOptions;
use crate::dates::DateSource;
use crate::library::{FolderProvider, LibrarySettings, SettingsProvider};
use crate::scanner::{
    MediaFilter, DEFAULT_IMAGE_EXTENSIONS, DEFAULT_MAX_VIDEO_SIZE, DEFAULT_VIDEO_EXTENSIONS,
};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "HOMEFEED_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library folders, in display priority order.
    pub folders: Vec<PathBuf>,

    /// Filesystem timestamp used when a file has no embedded date.
    pub date_source: DateSource,

    /// Rescan less often; for network shares and spinning disks.
    pub slow_storage_mode: bool,

    /// Image extensions (case-insensitive, leading dot optional).
    pub image_extensions: Vec<String>,

    /// Video extensions (case-insensitive, leading dot optional).
    pub video_extensions: Vec<String>,

    /// Videos larger than this many bytes are ignored.
    pub max_video_size: u64,

    /// Snapshot time-to-live in seconds.
    pub cache_ttl_secs: u64,

    /// Snapshot time-to-live in seconds when `slow_storage_mode` is set.
    pub slow_storage_ttl_secs: u64,

    /// Date cache file. Defaults to the platform cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_cache_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = LibrarySettings::default();
        Self {
            folders: Vec::new(),
            date_source: DateSource::default(),
            slow_storage_mode: false,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_video_size: DEFAULT_MAX_VIDEO_SIZE,
            cache_ttl_secs: settings.cache_ttl.as_secs(),
            slow_storage_ttl_secs: settings.slow_storage_ttl.as_secs(),
            date_cache_path: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "homefeed", "homefeed")
}

impl Config {
    /// Default configuration file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The figment for a given file, before extraction.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load from the default location. Never fails.
    #[must_use]
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No platform config directory, using defaults and environment");
                Self::figment(None).extract().unwrap_or_else(|e| {
                    log::warn!("Invalid configuration, using defaults: {}", e);
                    Self::default()
                })
            }
        }
    }

    /// Load from `path`. A missing file yields defaults; an invalid one is
    /// logged and also yields defaults.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Invalid configuration in {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load from `path`, reporting parse and type errors.
    pub fn try_load_from_path(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        let path = path.as_ref();
        if path.exists() {
            log::debug!("Loading configuration from {}", path.display());
        }
        Self::figment(Some(path)).extract()
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing configuration")
    }

    /// Apply command-line overrides, the last configuration layer.
    pub fn apply_scan_options(&mut self, opts: &ScanOptions) {
        if !opts.folders.is_empty() {
            self.folders = opts.folders.clone();
        }
        if let Some(date_source) = opts.date_source {
            self.date_source = date_source;
        }
        if opts.slow_storage {
            self.slow_storage_mode = true;
        }
        if let Some(max) = opts.max_video_size {
            self.max_video_size = max;
        }
    }

    /// Location of the metadata date cache file.
    #[must_use]
    pub fn date_cache_path(&self) -> PathBuf {
        if let Some(path) = &self.date_cache_path {
            return path.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.cache_dir().join(DATE_CACHE_FILE_NAME),
            None => std::env::temp_dir().join("homefeed").join(DATE_CACHE_FILE_NAME),
        }
    }

    /// The extension and size policy.
    #[must_use]
    pub fn media_filter(&self) -> MediaFilter {
        MediaFilter::new(
            &self.image_extensions,
            &self.video_extensions,
            self.max_video_size,
        )
    }

    /// Settings consumed by the library cache.
    #[must_use]
    pub fn settings(&self) -> LibrarySettings {
        LibrarySettings {
            date_source: self.date_source,
            slow_storage_mode: self.slow_storage_mode,
            filter: self.media_filter(),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            slow_storage_ttl: Duration::from_secs(self.slow_storage_ttl_secs),
        }
    }
}

impl SettingsProvider for Config {
    fn library_settings(&self) -> LibrarySettings {
        self.settings()
    }
}

impl FolderProvider for Config {
    fn active_folders(&self) -> Vec<PathBuf> {
        self.folders.clone()
    }
}
