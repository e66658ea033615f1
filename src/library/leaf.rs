//! Leaf folder summaries.
//!
//! A leaf folder is any directory that directly contains at least one
//! library image. Summaries are derived from a [`Snapshot`] without
//! touching the disk, except for an image whose date is somehow missing
//! from the snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::path_utils::display_name;
use crate::scanner::unix_seconds;

use super::snapshot::Snapshot;

/// Summary of one directory holding images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafFolder {
    /// Directory path
    pub path: PathBuf,
    /// Final path segment
    pub name: String,
    /// Number of images directly inside
    pub count: usize,
    /// Newest effective date among those images
    pub newest_effective_date: f64,
}

/// Group a snapshot's images by directory.
///
/// Folders come out newest first, ties broken by path.
#[must_use]
pub fn aggregate(snapshot: &Snapshot) -> Vec<LeafFolder> {
    let mut folders: HashMap<&Path, (usize, f64)> = HashMap::new();

    for image in snapshot.images() {
        let Some(parent) = image.parent() else { continue };
        let date = snapshot
            .effective_date(image)
            .unwrap_or_else(|| stat_mtime(image));

        let slot = folders.entry(parent).or_insert((0, f64::NEG_INFINITY));
        slot.0 += 1;
        if date > slot.1 {
            slot.1 = date;
        }
    }

    let mut leaves: Vec<LeafFolder> = folders
        .into_iter()
        .map(|(path, (count, newest))| LeafFolder {
            path: path.to_path_buf(),
            name: display_name(path),
            count,
            newest_effective_date: newest,
        })
        .collect();

    leaves.sort_by(|a, b| {
        b.newest_effective_date
            .total_cmp(&a.newest_effective_date)
            .then_with(|| a.path.cmp(&b.path))
    });

    log::debug!("Aggregated {} leaf folders", leaves.len());
    leaves
}

fn stat_mtime(path: &Path) -> f64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(unix_seconds)
        .unwrap_or(0.0)
}
