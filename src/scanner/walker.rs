//! Recursive media discovery using jwalk.
//!
//! # Overview
//!
//! [`Walker`] enumerates every file below one resolved folder, keeps the
//! ones whose extension is supported and stats each survivor exactly once.
//! The stat result travels with the [`FileEntry`] so later stages never
//! touch the filesystem again for the size check, the date cache key or
//! the filesystem date fallback.
//!
//! Traversal is serial and children are sorted by file name, so a folder
//! always yields its files in the same order.
//!
//! Directory symlinks are not followed. File symlinks are stat'ed through,
//! so a link to a photo counts as that photo.

use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use super::{FileEntry, MediaFilter, ScanError};

/// Directory walker yielding supported media files.
#[derive(Debug)]
pub struct Walker<'a> {
    /// Root path to walk
    root: PathBuf,
    /// Extension and size policy
    filter: &'a MediaFilter,
}

impl<'a> Walker<'a> {
    /// Create a new walker for the given (already resolved) folder.
    #[must_use]
    pub fn new(path: &Path, filter: &'a MediaFilter) -> Self {
        Self {
            root: path.to_path_buf(),
            filter,
        }
    }

    /// Walk the directory tree, yielding media file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Unsupported extensions and oversized videos are dropped
    /// silently.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use homefeed::scanner::{MediaFilter, Walker};
    /// use std::path::Path;
    ///
    /// let filter = MediaFilter::default();
    /// let walker = Walker::new(Path::new("."), &filter);
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} media files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .sort(true)
            .parallelism(Parallelism::Serial);

        walk_dir.into_iter().filter_map(move |entry_result| match entry_result {
            Ok(entry) => {
                if entry.file_type().is_dir() {
                    return None;
                }
                self.process_path(entry.path())
            }
            Err(e) => {
                let path = e
                    .path()
                    .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                Some(Err(self.handle_jwalk_error(path, &e)))
            }
        })
    }

    /// Classify, stat and size-check one candidate path.
    fn process_path(&self, path: PathBuf) -> Option<Result<FileEntry, ScanError>> {
        // Extension first: unsupported files are never stat'ed.
        let Some(kind) = self.filter.classify(&path) else {
            log::trace!("Skipping unsupported file: {}", path.display());
            return None;
        };

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_io_error(&path, e))),
        };

        if !metadata.is_file() {
            return None;
        }

        let entry = FileEntry::from_metadata(path, &metadata, kind);
        if !self.filter.accepts_size(kind, entry.size) {
            log::debug!(
                "Skipping video over size limit ({} > {}): {}",
                entry.size,
                self.filter.max_video_size(),
                entry.path.display()
            );
            return None;
        }

        Some(Ok(entry))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        let err = ScanError::from_io(path, error);
        match &err {
            ScanError::PermissionDenied(_) => log::warn!("{}", err),
            ScanError::NotFound(_) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
            }
            _ => log::warn!("{}", err),
        }
        err
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: &jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        ScanError::Walk {
            path,
            message: error.to_string(),
        }
    }
}
