//! JSON listings.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "images": [
//!     {"path": "/lib/b.jpg", "effective_date": 1700000200.0}
//!   ],
//!   "summary": {
//!     "files_found": 2,
//!     "folders_scanned": 1,
//!     "folders_missing": 0,
//!     "files_skipped": 0,
//!     "date_cache_hits": 1,
//!     "metadata_reads": 1,
//!     "scan_duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "HF000"
//!   }
//! }
//! ```
//!
//! `homefeed leaves` emits the same shape with `folders` in place of
//! `images`.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ExitCode;
use crate::library::{LeafFolder, Snapshot};
use crate::scanner::ScanSummary;

/// One image with its effective date.
#[derive(Debug, Clone, Serialize)]
pub struct JsonImage {
    /// Absolute path
    pub path: String,
    /// Effective date, Unix seconds
    pub effective_date: f64,
}

/// Scan counters.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Media files in the library
    pub files_found: usize,
    /// Folders walked
    pub folders_scanned: usize,
    /// Configured folders that do not exist
    pub folders_missing: usize,
    /// Files skipped because of I/O errors
    pub files_skipped: usize,
    /// Date cache hits (dates and confirmed absences)
    pub date_cache_hits: usize,
    /// Files opened for embedded metadata
    pub metadata_reads: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "HF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Build from scan counters and the exit code of this run.
    #[must_use]
    pub fn new(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            files_found: summary.files_found,
            folders_scanned: summary.folders_scanned,
            folders_missing: summary.folders_missing,
            files_skipped: summary.files_skipped,
            date_cache_hits: summary.date_cache_hits(),
            metadata_reads: summary.metadata_reads,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Image listing.
#[derive(Debug, Clone, Serialize)]
pub struct JsonImages {
    /// Images, newest first
    pub images: Vec<JsonImage>,
    /// Scan counters
    pub summary: JsonSummary,
}

impl JsonImages {
    /// Pair each path with its date from `snapshot`.
    #[must_use]
    pub fn new(
        images: &[PathBuf],
        snapshot: &Snapshot,
        summary: &ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            images: images
                .iter()
                .map(|path| JsonImage {
                    path: path.to_string_lossy().into_owned(),
                    effective_date: snapshot.effective_date(path).unwrap_or(0.0),
                })
                .collect(),
            summary: JsonSummary::new(summary, exit_code),
        }
    }

    /// Write JSON to a writer.
    pub fn write_to<W: Write>(&self, writer: W, pretty: bool) -> serde_json::Result<()> {
        write_json(writer, self, pretty)
    }
}

/// Leaf folder listing.
#[derive(Debug, Clone, Serialize)]
pub struct JsonLeaves {
    /// Folders, newest first
    pub folders: Vec<LeafFolder>,
    /// Scan counters
    pub summary: JsonSummary,
}

impl JsonLeaves {
    /// Build from leaf summaries.
    #[must_use]
    pub fn new(folders: &[LeafFolder], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            folders: folders.to_vec(),
            summary: JsonSummary::new(summary, exit_code),
        }
    }

    /// Write JSON to a writer.
    pub fn write_to<W: Write>(&self, writer: W, pretty: bool) -> serde_json::Result<()> {
        write_json(writer, self, pretty)
    }
}

fn write_json<W, T>(mut writer: W, value: &T, pretty: bool) -> serde_json::Result<()>
where
    W: Write,
    T: Serialize,
{
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer).map_err(serde_json::Error::io)
}
