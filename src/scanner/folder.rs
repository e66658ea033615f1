//! Shallow folder freshness check.
//!
//! A folder's freshness value is the newest modification time among the
//! folder itself and its immediate subdirectories. Adding, removing or
//! renaming a file bumps the mtime of the directory that holds it, so this
//! catches changes at the top two levels without walking the whole tree.
//! Changes deeper down are picked up by the snapshot TTL instead.

use std::path::Path;

use walkdir::WalkDir;

use super::unix_seconds;

/// Max mtime of `folder` and its direct subdirectories, in Unix seconds.
///
/// Returns `0.0` if the folder does not exist or is not a directory.
/// Subdirectories that cannot be stat'ed are ignored.
#[must_use]
pub fn folder_mtime(folder: &Path) -> f64 {
    let own = match std::fs::metadata(folder) {
        Ok(m) if m.is_dir() => match m.modified() {
            Ok(t) => unix_seconds(t),
            Err(_) => return 0.0,
        },
        _ => return 0.0,
    };

    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                log::trace!("Skipping unreadable entry in {}: {}", folder.display(), err);
                None
            }
        })
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| e.metadata().ok()?.modified().ok())
        .map(unix_seconds)
        .fold(own, f64::max)
}
