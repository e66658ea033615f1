//! Full library scan.
//!
//! # Overview
//!
//! [`scan`] turns a folder list into a [`Snapshot`]:
//!
//! 1. Each configured folder is resolved. Missing folders are recorded
//!    with a shallow mtime of `0.0` and contribute no files.
//! 2. Existing folders get their shallow mtime recorded and are walked.
//! 3. Every media file gets an effective date from the [`DateResolver`].
//! 4. The snapshot sorts and indexes the results.
//! 5. New date cache entries are flushed to disk.
//!
//! The scan never fails. Per-file errors are logged and the file is
//! skipped; a failed date cache flush is logged and retried next time.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::dates::{DateOrigin, DateResolver};
use crate::library::{LibrarySettings, Snapshot};

use super::path_utils::resolve_folder;
use super::{folder_mtime, ScanError, Walker};

/// Counters collected during one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    /// Configured folders that existed and were walked
    pub folders_scanned: usize,
    /// Configured folders that do not exist or are not directories
    pub folders_missing: usize,
    /// Media files accepted into the snapshot
    pub files_found: usize,
    /// Files skipped because of I/O errors
    pub files_skipped: usize,
    /// Embedded dates served from the date cache
    pub cached_dates: usize,
    /// Confirmed absences served from the date cache
    pub cached_absences: usize,
    /// Files opened to look for an embedded date
    pub metadata_reads: usize,
    /// Files whose effective date came from embedded metadata
    pub metadata_dates: usize,
    /// Whether the date cache was written at the end of the scan
    pub date_cache_flushed: bool,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Date cache hits of either kind.
    #[must_use]
    pub fn date_cache_hits(&self) -> usize {
        self.cached_dates + self.cached_absences
    }
}

/// Scan `folders` and build a snapshot.
///
/// Folders are walked in the given order. A folder listed twice (or two
/// spellings of the same folder) is walked once.
pub fn scan(
    folders: &[PathBuf],
    settings: &LibrarySettings,
    resolver: &DateResolver,
) -> (Snapshot, ScanSummary) {
    let start_time = Instant::now();
    let mut summary = ScanSummary::default();
    let mut folder_mtimes = BTreeMap::new();
    let mut walked = HashSet::new();
    let mut entries = Vec::new();

    log::info!("Starting library scan of {} folder(s)", folders.len());

    for folder in folders {
        let root = resolve_folder(folder);
        if !root.is_dir() {
            log::debug!("Skipping missing folder: {}", root.display());
            folder_mtimes.insert(folder.clone(), 0.0);
            summary.folders_missing += 1;
            continue;
        }

        folder_mtimes.insert(folder.clone(), folder_mtime(&root));
        if !walked.insert(root.clone()) {
            log::debug!("Folder already scanned: {}", root.display());
            continue;
        }
        summary.folders_scanned += 1;

        for result in Walker::new(&root, &settings.filter).walk() {
            let file = match result {
                Ok(file) => file,
                Err(e) => {
                    skip(&e);
                    summary.files_skipped += 1;
                    continue;
                }
            };

            let resolved = resolver.resolve(&file, settings.date_source);
            if resolved.read_metadata {
                summary.metadata_reads += 1;
            }
            match resolved.origin {
                DateOrigin::CachedMetadata => summary.cached_dates += 1,
                DateOrigin::ExtractedMetadata => {}
                DateOrigin::Filesystem if resolved.cache_hit => summary.cached_absences += 1,
                DateOrigin::Filesystem => {}
            }
            if resolved.origin != DateOrigin::Filesystem {
                summary.metadata_dates += 1;
            }

            entries.push((file.path, resolved.timestamp));
        }
    }

    let snapshot = Snapshot::build(entries, folder_mtimes, settings.date_source);
    summary.files_found = snapshot.len();

    match resolver.flush() {
        Ok(flushed) => summary.date_cache_flushed = flushed,
        Err(e) => log::warn!("Failed to save date cache: {}", e),
    }

    summary.scan_duration = start_time.elapsed();
    log::info!(
        "Scan complete: {} files in {} folder(s), {} date cache hits, {} metadata reads, {:.2?}",
        summary.files_found,
        summary.folders_scanned,
        summary.date_cache_hits(),
        summary.metadata_reads,
        summary.scan_duration
    );

    (snapshot, summary)
}

/// The one place a per-file error becomes "skip this file".
fn skip(error: &ScanError) {
    log::debug!("Skipping file: {}", error);
}
