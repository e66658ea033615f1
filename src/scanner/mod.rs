//! Library scanner: folder traversal, media filtering and stat collection.
//!
//! This module provides functionality for:
//! - Recursive media discovery using jwalk
//! - Extension and video-size filtering
//! - Shallow folder freshness checks (folder + immediate subdirectories)
//! - Folder path resolution and Unicode normalization
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`folder`]: One-level-deep folder modification time
//! - [`scan`]: Full library scan producing a [`crate::library::Snapshot`]
//! - [`path_utils`]: Path resolution (`~`, relative paths, NFC)
//!
//! # Example
//!
//! ```no_run
//! use homefeed::scanner::{MediaFilter, Walker};
//! use std::path::Path;
//!
//! let filter = MediaFilter::default();
//! let walker = Walker::new(Path::new("/srv/photos"), &filter);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod folder;
pub mod path_utils;
pub mod scan;
pub mod walker;

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use folder::folder_mtime;
pub use scan::{scan, ScanSummary};
pub use walker::Walker;

/// Default image extensions recognized by the scanner.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "heic", "heif", "avif",
];

/// Default video extensions recognized by the scanner.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "mkv", "avi"];

/// Default upper bound for video files (500 MiB).
pub const DEFAULT_MAX_VIDEO_SIZE: u64 = 500 * 1024 * 1024;

/// Kind of media a supported extension maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Still image; eligible for embedded date extraction.
    Image,
    /// Video; subject to the size limit, never opened for metadata.
    Video,
}

/// A media file discovered by the walker, with the single stat taken for it.
///
/// The same stat feeds the size check, the date cache key and the
/// filesystem date fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Modification time, Unix seconds (0.0 if unavailable)
    pub mtime: f64,
    /// Creation time, Unix seconds (0.0 if unavailable)
    pub ctime: f64,
    /// Image or video
    pub kind: MediaKind,
}

impl FileEntry {
    /// Build an entry from filesystem metadata.
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &Metadata, kind: MediaKind) -> Self {
        Self {
            path,
            size: metadata.len(),
            mtime: metadata.modified().map(unix_seconds).unwrap_or(0.0),
            ctime: creation_seconds(metadata),
            kind,
        }
    }
}

/// Convert a [`SystemTime`] to fractional Unix seconds.
///
/// Times before the epoch come out negative.
#[must_use]
pub fn unix_seconds(time: SystemTime) -> f64 {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Creation time in Unix seconds.
///
/// Uses the birth time when the platform reports one. On Unix systems
/// without birth time support the inode change time is used instead.
#[must_use]
pub fn creation_seconds(metadata: &Metadata) -> f64 {
    match metadata.created() {
        Ok(t) => unix_seconds(t),
        Err(_) => change_seconds(metadata),
    }
}

#[cfg(unix)]
fn change_seconds(metadata: &Metadata) -> f64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ctime() as f64 + metadata.ctime_nsec() as f64 / 1e9
}

#[cfg(not(unix))]
fn change_seconds(_metadata: &Metadata) -> f64 {
    0.0
}

/// Which files the scanner accepts.
///
/// Extensions are stored lowercase without a leading dot. Video extensions
/// are always supported, even when absent from the image set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    image_extensions: HashSet<String>,
    video_extensions: HashSet<String>,
    max_video_size: u64,
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_IMAGE_EXTENSIONS.iter().copied(),
            DEFAULT_VIDEO_EXTENSIONS.iter().copied(),
            DEFAULT_MAX_VIDEO_SIZE,
        )
    }
}

impl MediaFilter {
    /// Create a filter from extension lists (case and leading dots ignored).
    #[must_use]
    pub fn new<I, V, S, T>(images: I, videos: V, max_video_size: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        V: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            image_extensions: images.into_iter().map(|e| normalize_extension(e.as_ref())).collect(),
            video_extensions: videos.into_iter().map(|e| normalize_extension(e.as_ref())).collect(),
            max_video_size,
        }
    }

    /// Set the maximum accepted video size in bytes.
    #[must_use]
    pub fn with_max_video_size(mut self, bytes: u64) -> Self {
        self.max_video_size = bytes;
        self
    }

    /// Maximum accepted video size in bytes.
    #[must_use]
    pub fn max_video_size(&self) -> u64 {
        self.max_video_size
    }

    /// Classify a path by extension. `None` means unsupported.
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if self.video_extensions.contains(&ext) {
            Some(MediaKind::Video)
        } else if self.image_extensions.contains(&ext) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    /// Whether a file of this kind and size passes the size policy.
    #[must_use]
    pub fn accepts_size(&self, kind: MediaKind, size: u64) -> bool {
        kind != MediaKind::Video || size <= self.max_video_size
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Errors that can occur while scanning a single file or directory.
///
/// None of these abort a scan; the scan loop logs and skips.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path vanished between listing and stat.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The directory walker failed to read an entry.
    #[error("Walk error for {path}: {message}")]
    Walk {
        /// Path where the error occurred
        path: PathBuf,
        /// Description from the walker
        message: String,
    },
}

impl ScanError {
    /// Classify an I/O error at the point it happened.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
