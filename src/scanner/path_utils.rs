//! Folder path resolution and Unicode path normalization.
//!
//! Configured folders arrive as user-typed strings (`~/Pictures`,
//! `/mnt/photos/../photos/`). Before the scanner touches them they are
//! expanded and normalized so that the same folder always maps to the same
//! absolute path.
//!
//! # Unicode
//!
//! macOS stores file names in NFD (decomposed) form while most callers type
//! NFC (composed) names. The same visual folder can therefore have two byte
//! representations:
//!
//! - NFC: `café` - 'é' is U+00E9 (single code point)
//! - NFD: `café` - 'e' U+0065 + combining acute accent U+0301
//!
//! Folder lookups match the exact spelling first. When that misses, the
//! NFC form from [`folder_key`] lets the other spelling find the folder, as
//! long as only one scanned directory has that form. Linux allows both
//! spellings side by side as distinct directories.
//!
//! # Example
//!
//! ```
//! use homefeed::scanner::path_utils::{normalize_path_str, path_key};
//! use std::path::Path;
//!
//! let nfc = "café";
//! let nfd = "cafe\u{0301}";
//! assert_eq!(normalize_path_str(nfc), normalize_path_str(nfd));
//! assert_eq!(path_key(Path::new(nfc)), path_key(Path::new(nfd)));
//! ```

use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;
use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
///
/// # Example
///
/// ```
/// use homefeed::scanner::path_utils::normalize_path_str;
///
/// let nfd = "cafe\u{0301}.jpg"; // NFD form
/// assert_eq!(normalize_path_str(nfd), "café.jpg");
/// ```
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize a [`Path`] to NFC form.
///
/// Paths that are not valid UTF-8 are returned unchanged.
#[must_use]
pub fn normalize_pathbuf(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if !unicode_normalization::is_nfc(s) => PathBuf::from(normalize_path_str(s)),
        _ => path.to_path_buf(),
    }
}

/// Create a normalized comparison key for a path.
///
/// Lossy for paths that are not valid UTF-8.
#[must_use]
pub fn path_key(path: &Path) -> String {
    normalize_path_str(&path.to_string_lossy())
}

/// Expand a leading `~` to the current user's home directory.
///
/// Only `~` and `~/...` are expanded; `~user` forms are left alone.
///
/// # Example
///
/// ```
/// use homefeed::scanner::path_utils::expand_path;
/// use std::path::Path;
///
/// assert_eq!(expand_path(Path::new("/srv/photos")), Path::new("/srv/photos"));
/// ```
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(components.as_path()),
            None => {
                log::debug!("No home directory available, leaving {} as is", path.display());
                path.to_path_buf()
            }
        },
        _ => path.to_path_buf(),
    }
}

/// Lexically normalize a path: drop `.` components, fold `..` into its
/// parent and strip trailing separators. Does not touch the filesystem, so
/// symlinks are not resolved.
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve a configured folder to the absolute path the scanner walks.
///
/// Expands `~`, anchors relative paths at the current working directory
/// and cleans the result lexically.
#[must_use]
pub fn resolve_folder(folder: &Path) -> PathBuf {
    let expanded = expand_path(folder);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(expanded),
            Err(e) => {
                log::debug!("Cannot read working directory ({}), using {} as is", e, folder.display());
                expanded
            }
        }
    };
    clean_path(&absolute)
}

/// NFC key for fallback folder lookups.
#[must_use]
pub fn folder_key(dir: &Path) -> PathBuf {
    normalize_pathbuf(&clean_path(dir))
}

/// Final path segment used as a folder's display name.
///
/// Falls back to the whole path for roots such as `/`.
#[must_use]
pub fn display_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned())
}
