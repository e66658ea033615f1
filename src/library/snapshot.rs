//! Immutable scan result.
//!
//! A [`Snapshot`] is built in one go by [`Snapshot::build`] and never
//! modified afterwards. The library cache swaps whole snapshots, so a reader
//! holding one always sees a consistent set of images, dates and indexes.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::dates::DateSource;
use crate::scanner::path_utils::{clean_path, folder_key};

/// One complete library scan.
#[derive(Debug, Clone)]
pub struct Snapshot {
    images: Vec<PathBuf>,
    effective_dates: HashMap<PathBuf, f64>,
    /// Keyed by the exact (lexically cleaned) parent directory.
    folder_index: HashMap<PathBuf, Vec<PathBuf>>,
    /// NFC folder key to the exact index keys sharing it.
    folder_aliases: HashMap<PathBuf, Vec<PathBuf>>,
    folder_mtimes: BTreeMap<PathBuf, f64>,
    timestamp: SystemTime,
    date_source: DateSource,
}

/// Newest first; equal dates fall back to path order.
fn newest_first(a: &(PathBuf, f64), b: &(PathBuf, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

impl Snapshot {
    /// Build a snapshot stamped with the current time.
    ///
    /// `entries` pairs each file with its effective date; a path listed
    /// twice keeps its first date. `folder_mtimes` maps each configured
    /// folder to its shallow mtime at scan time.
    #[must_use]
    pub fn build(
        entries: Vec<(PathBuf, f64)>,
        folder_mtimes: BTreeMap<PathBuf, f64>,
        date_source: DateSource,
    ) -> Self {
        Self::build_at(entries, folder_mtimes, date_source, SystemTime::now())
    }

    /// Build a snapshot with an explicit build time.
    #[must_use]
    pub fn build_at(
        entries: Vec<(PathBuf, f64)>,
        folder_mtimes: BTreeMap<PathBuf, f64>,
        date_source: DateSource,
        timestamp: SystemTime,
    ) -> Self {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut entries: Vec<_> = entries
            .into_iter()
            .filter(|(path, _)| seen.insert(path.clone()))
            .collect();
        entries.sort_by(newest_first);

        let mut folder_index: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        let mut folder_aliases: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        let mut effective_dates = HashMap::with_capacity(entries.len());
        let mut images = Vec::with_capacity(entries.len());

        for (path, date) in entries {
            if let Some(parent) = path.parent() {
                let exact = clean_path(parent);
                if !folder_index.contains_key(&exact) {
                    folder_aliases
                        .entry(folder_key(&exact))
                        .or_default()
                        .push(exact.clone());
                }
                folder_index.entry(exact).or_default().push(path.clone());
            }
            effective_dates.insert(path.clone(), date);
            images.push(path);
        }

        Self {
            images,
            effective_dates,
            folder_index,
            folder_aliases,
            folder_mtimes,
            timestamp,
            date_source,
        }
    }

    /// All images, newest first.
    #[must_use]
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    /// Number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the scan found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Effective date of one image.
    #[must_use]
    pub fn effective_date(&self, path: &Path) -> Option<f64> {
        self.effective_dates.get(path).copied()
    }

    /// Images directly inside `dir`, in global order. Empty for unknown
    /// directories.
    ///
    /// The exact spelling of `dir` wins. Otherwise its NFC form is matched,
    /// but only if a single scanned directory has that form.
    #[must_use]
    pub fn images_in_folder(&self, dir: &Path) -> &[PathBuf] {
        let exact = clean_path(dir);
        if let Some(images) = self.folder_index.get(&exact) {
            return images;
        }
        match self.folder_aliases.get(&folder_key(&exact)).map(Vec::as_slice) {
            Some([only]) => self
                .folder_index
                .get(only)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            _ => &[],
        }
    }

    /// Number of directories that directly hold images.
    #[must_use]
    pub fn folder_count(&self) -> usize {
        self.folder_index.len()
    }

    /// Configured folder to shallow mtime, as observed at scan time.
    #[must_use]
    pub fn folder_mtimes(&self) -> &BTreeMap<PathBuf, f64> {
        &self.folder_mtimes
    }

    /// When the snapshot was built.
    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Age at `now`, or `None` if the build time lies in the future.
    #[must_use]
    pub fn age_at(&self, now: SystemTime) -> Option<Duration> {
        now.duration_since(self.timestamp).ok()
    }

    /// Date source active when the snapshot was built.
    #[must_use]
    pub fn date_source(&self) -> DateSource {
        self.date_source
    }
}
