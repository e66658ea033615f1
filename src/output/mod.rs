//! Output formatters for library listings.
//!
//! - [`json`]: machine-readable listings with scan counters
//! - [`text`]: one entry per line for terminals and pipes
//!
//! # Example
//!
//! ```
//! use homefeed::output::text::TextOutput;
//! use std::path::PathBuf;
//!
//! let images = vec![PathBuf::from("/lib/b.jpg"), PathBuf::from("/lib/a.jpg")];
//! let mut out = Vec::new();
//! TextOutput::new(false).write_images(&mut out, &images).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "/lib/b.jpg\n/lib/a.jpg\n");
//! ```

pub mod json;
pub mod text;

pub use json::{JsonImage, JsonImages, JsonLeaves, JsonSummary};
pub use text::TextOutput;

/// Render a Unix timestamp as local `YYYY-MM-DD HH:MM:SS`.
///
/// Zero and out-of-range values render as `-`.
#[must_use]
pub fn format_timestamp(ts: f64) -> String {
    use chrono::{Local, TimeZone};

    if ts == 0.0 || !ts.is_finite() {
        return "-".to_string();
    }
    match Local.timestamp_opt(ts.trunc() as i64, 0).earliest() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}
