//! Effective date resolution.
//!
//! A file's effective date is the best timestamp available for it, in this
//! order:
//!
//! 1. Embedded capture date (EXIF `DateTimeOriginal`, then
//!    `DateTimeDigitized`) for non-video files, served from the
//!    [`crate::cache::MetadataDateCache`] whenever the file is unchanged.
//! 2. A filesystem timestamp chosen by [`DateSource`].
//! 3. `0.0` if nothing is available.
//!
//! # Architecture
//!
//! * [`DateExtractor`]: the optional metadata extraction capability.
//! * [`embedded`]: the kamadak-exif backed extractor (feature `exif`).
//! * [`resolver`]: [`DateResolver`], which combines cache, extractor and
//!   filesystem fallback.

#[cfg(feature = "exif")]
pub mod embedded;
pub mod resolver;

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[cfg(feature = "exif")]
pub use embedded::ExifDateExtractor;
pub use resolver::{DateOrigin, DateResolver, ResolvedDate};

/// Format of EXIF date-time values (`2023:07:14 18:02:11`).
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Which filesystem timestamp is preferred when no embedded date exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    /// Modification time first, creation time as fallback
    #[default]
    Mtime,
    /// Creation time first, modification time as fallback
    Ctime,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::Mtime => write!(f, "mtime"),
            DateSource::Ctime => write!(f, "ctime"),
        }
    }
}

/// Filesystem fallback date.
///
/// Zero counts as unavailable, so a zero preferred timestamp falls through
/// to the other one.
///
/// # Example
///
/// ```
/// use homefeed::dates::{fallback_date, DateSource};
///
/// assert_eq!(fallback_date(DateSource::Mtime, 100.0, 200.0), 100.0);
/// assert_eq!(fallback_date(DateSource::Ctime, 100.0, 200.0), 200.0);
/// assert_eq!(fallback_date(DateSource::Ctime, 100.0, 0.0), 100.0);
/// ```
#[must_use]
pub fn fallback_date(source: DateSource, mtime: f64, ctime: f64) -> f64 {
    let (preferred, other) = match source {
        DateSource::Mtime => (mtime, ctime),
        DateSource::Ctime => (ctime, mtime),
    };
    if preferred != 0.0 {
        preferred
    } else {
        other
    }
}

/// Reasons an embedded date could not be read.
///
/// Every variant ends up as the same outcome (cache an explicit "no date"
/// and use the filesystem fallback); the variants exist for logging.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    /// The file could not be opened or read.
    #[error("I/O error reading metadata from {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The container format carries no readable metadata.
    #[error("Unsupported metadata in {path}: {message}")]
    Unsupported {
        /// File being read
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Metadata exists but holds neither date tag.
    #[error("No capture date tag in {0}")]
    NoDateTag(PathBuf),

    /// A date tag exists but does not parse.
    #[error("Invalid capture date '{value}' in {path}")]
    InvalidDate {
        /// File being read
        path: PathBuf,
        /// Raw tag value
        value: String,
    },

    /// No extraction backend is compiled in.
    #[error("Metadata extraction is not available")]
    Unavailable,
}

/// Capability to read an embedded capture date from a file.
pub trait DateExtractor: Send + Sync {
    /// Read the capture date as Unix seconds.
    fn extract(&self, path: &Path) -> Result<f64, ExtractError>;

    /// Whether this extractor can ever succeed.
    ///
    /// When `false` the resolver never opens files.
    fn is_available(&self) -> bool {
        true
    }
}

/// Extractor used when no metadata backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl DateExtractor for NoMetadata {
    fn extract(&self, _path: &Path) -> Result<f64, ExtractError> {
        Err(ExtractError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// The best extractor compiled into this build.
#[must_use]
pub fn default_extractor() -> Box<dyn DateExtractor> {
    #[cfg(feature = "exif")]
    {
        Box::new(ExifDateExtractor::new())
    }
    #[cfg(not(feature = "exif"))]
    {
        log::info!("Built without EXIF support, using filesystem dates only");
        Box::new(NoMetadata)
    }
}

/// Parse an EXIF date-time string as local wall-clock time.
///
/// Returns `None` for malformed or out-of-range values. An ambiguous local
/// time (DST fall-back) resolves to its earlier instant. A local time that
/// does not exist (DST spring-forward gap) is shifted forward by the usual
/// one-hour gap, so `02:30` in a skipped hour reads as `03:30`.
#[must_use]
pub fn parse_exif_datetime(raw: &str) -> Option<f64> {
    use chrono::{Local, NaiveDateTime, TimeDelta, TimeZone};

    let naive = NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATE_FORMAT).ok()?;
    let local = Local.from_local_datetime(&naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
        Local.from_local_datetime(&shifted).earliest()
    })?;
    Some(local.timestamp() as f64)
}
