//! EXIF capture date extraction backed by kamadak-exif.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{In, Reader, Tag, Value};

use super::{parse_exif_datetime, DateExtractor, ExtractError};

/// Tags tried in order: shutter time, then digitization time.
const DATE_TAGS: [Tag; 2] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized];

/// Reads `DateTimeOriginal` / `DateTimeDigitized` from any container
/// kamadak-exif understands (JPEG, TIFF and TIFF-based RAW, HEIF, PNG, WebP).
#[derive(Debug, Default)]
pub struct ExifDateExtractor {
    _private: (),
}

impl ExifDateExtractor {
    /// Create a new extractor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DateExtractor for ExifDateExtractor {
    fn extract(&self, path: &Path) -> Result<f64, ExtractError> {
        let file = File::open(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| match e {
                exif::Error::Io(source) => ExtractError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                exif::Error::NotFound(_) => ExtractError::NoDateTag(path.to_path_buf()),
                other => ExtractError::Unsupported {
                    path: path.to_path_buf(),
                    message: other.to_string(),
                },
            })?;

        let mut invalid = None;
        for tag in DATE_TAGS {
            // The primary IFD is authoritative; other IFDs only fill gaps.
            let field = exif
                .get_field(tag, In::PRIMARY)
                .or_else(|| exif.fields().find(|f| f.tag == tag));
            let Some(field) = field else { continue };

            let Some(raw) = ascii_value(&field.value) else { continue };
            match parse_exif_datetime(&raw) {
                Some(ts) => return Ok(ts),
                None => invalid = Some(raw),
            }
        }

        Err(match invalid {
            Some(value) => ExtractError::InvalidDate {
                path: path.to_path_buf(),
                value,
            },
            None => ExtractError::NoDateTag(path.to_path_buf()),
        })
    }
}

/// First string of an ASCII field, without the trailing NULs.
fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .to_string()
        }),
        _ => None,
    }
}
