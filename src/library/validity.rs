//! Snapshot validity checks.
//!
//! A snapshot may be served as long as none of these hold:
//!
//! 1. There is no snapshot.
//! 2. The date source changed since it was built.
//! 3. It is older than the TTL (or its build time lies in the future).
//! 4. The active folder set differs from the recorded one.
//! 5. Some active folder's shallow mtime moved past the recorded value.
//!
//! Checks run in that order and stop at the first failure. Only step 5
//! touches the filesystem, and only with one stat per folder and immediate
//! subdirectory.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::dates::DateSource;
use crate::scanner::folder_mtime;
use crate::scanner::path_utils::resolve_folder;

use super::context::RequestContext;
use super::snapshot::Snapshot;

/// Why a snapshot cannot be served.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidReason {
    /// Nothing scanned yet, or the cache was invalidated.
    NoSnapshot,
    /// The filesystem fallback preference changed.
    DateSourceChanged {
        /// Source the snapshot was built with
        built_with: DateSource,
        /// Source now requested
        requested: DateSource,
    },
    /// The snapshot outlived the TTL.
    Expired {
        /// Snapshot age, `None` if it was stamped in the future
        age: Option<Duration>,
        /// TTL in effect
        ttl: Duration,
    },
    /// Folders were added to or removed from the active set.
    FolderSetChanged,
    /// A folder or one of its immediate subdirectories was modified.
    FolderModified {
        /// Configured folder
        folder: PathBuf,
        /// Shallow mtime at scan time
        recorded: f64,
        /// Shallow mtime now
        current: f64,
    },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSnapshot => write!(f, "no snapshot"),
            Self::DateSourceChanged {
                built_with,
                requested,
            } => write!(f, "date source changed from {} to {}", built_with, requested),
            Self::Expired { age: Some(age), ttl } => write!(
                f,
                "snapshot is {}s old (ttl {}s)",
                age.as_secs(),
                ttl.as_secs()
            ),
            Self::Expired { age: None, .. } => write!(f, "snapshot time lies in the future"),
            Self::FolderSetChanged => write!(f, "active folder set changed"),
            Self::FolderModified {
                folder,
                recorded,
                current,
            } => write!(
                f,
                "{} modified ({} > {})",
                folder.display(),
                current,
                recorded
            ),
        }
    }
}

/// Outcome of a validity check.
#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    /// The snapshot may be served.
    Valid,
    /// A rescan is required.
    Invalid(InvalidReason),
}

impl Validity {
    /// Whether the snapshot may be served.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Check a snapshot against the request context, probing folders on disk.
#[must_use]
pub fn check(snapshot: Option<&Snapshot>, ctx: &RequestContext, now: SystemTime) -> Validity {
    check_with(snapshot, ctx, now, |folder| {
        folder_mtime(&resolve_folder(folder))
    })
}

/// Check a snapshot using `read_mtime` to read a configured folder's shallow
/// mtime.
pub fn check_with<F>(
    snapshot: Option<&Snapshot>,
    ctx: &RequestContext,
    now: SystemTime,
    mut read_mtime: F,
) -> Validity
where
    F: FnMut(&Path) -> f64,
{
    let Some(snapshot) = snapshot else {
        return Validity::Invalid(InvalidReason::NoSnapshot);
    };

    if snapshot.date_source() != ctx.date_source() {
        return Validity::Invalid(InvalidReason::DateSourceChanged {
            built_with: snapshot.date_source(),
            requested: ctx.date_source(),
        });
    }

    let ttl = ctx.settings().effective_ttl();
    let age = snapshot.age_at(now);
    if age.map_or(true, |age| age > ttl) {
        return Validity::Invalid(InvalidReason::Expired { age, ttl });
    }

    let active: BTreeSet<&Path> = ctx.folders().iter().map(PathBuf::as_path).collect();
    let recorded: BTreeSet<&Path> = snapshot
        .folder_mtimes()
        .keys()
        .map(PathBuf::as_path)
        .collect();
    if active != recorded {
        return Validity::Invalid(InvalidReason::FolderSetChanged);
    }

    for (folder, &recorded) in snapshot.folder_mtimes() {
        let current = read_mtime(folder);
        if current > recorded {
            return Validity::Invalid(InvalidReason::FolderModified {
                folder: folder.clone(),
                recorded,
                current,
            });
        }
    }

    Validity::Valid
}
