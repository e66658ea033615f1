//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use filetime::{set_file_mtime, FileTime};
use homefeed::cache::MetadataDateCache;
use homefeed::dates::{DateExtractor, DateResolver, ExtractError};
use homefeed::library::{FolderList, LibraryCache, LibrarySettings, SharedSettings};

/// Write `content` to `path` (creating parents) and set its mtime.
pub fn write_file(path: &Path, content: &[u8], mtime: i64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

/// Set a directory's mtime.
pub fn touch_dir(path: &Path, mtime: i64) {
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

/// Extractor answering from a file-name table and counting every call.
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    dates: Arc<HashMap<String, f64>>,
    calls: Arc<AtomicUsize>,
}

impl TableExtractor {
    pub fn new(dates: &[(&str, f64)]) -> Self {
        Self {
            dates: Arc::new(dates.iter().map(|(n, d)| (n.to_string(), *d)).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DateExtractor for TableExtractor {
    fn extract(&self, path: &Path) -> Result<f64, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dates
            .get(&name)
            .copied()
            .ok_or_else(|| ExtractError::NoDateTag(path.to_path_buf()))
    }
}

/// A library over `folders` with mutable settings and folder list.
pub struct Fixture {
    pub library: LibraryCache,
    pub settings: Arc<SharedSettings>,
    pub folders: Arc<FolderList>,
}

impl Fixture {
    pub fn new(folders: Vec<PathBuf>, cache: MetadataDateCache, extractor: TableExtractor) -> Self {
        Self::with_settings(folders, cache, extractor, LibrarySettings::default())
    }

    pub fn with_settings(
        folders: Vec<PathBuf>,
        cache: MetadataDateCache,
        extractor: TableExtractor,
        settings: LibrarySettings,
    ) -> Self {
        let settings = Arc::new(SharedSettings::new(settings));
        let folders = Arc::new(FolderList::new(folders));
        let resolver = DateResolver::new(cache, Box::new(extractor));
        let library = LibraryCache::new(settings.clone(), folders.clone(), resolver);
        Self {
            library,
            settings,
            folders,
        }
    }

    pub fn all_images(&self) -> Vec<PathBuf> {
        self.library.get_all_images(&self.library.context())
    }
}

/// A minimal JPEG whose EXIF block holds only DateTimeOriginal.
pub fn jpeg_with_date(date: &str) -> Vec<u8> {
    assert_eq!(date.len(), 19);
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // IFD0 -> Exif IFD pointer
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    // Exif IFD -> DateTimeOriginal
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&20u32.to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(date.as_bytes());
    tiff.push(0);

    let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
    let len = (2 + 6 + tiff.len()) as u16;
    jpeg.extend_from_slice(&len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xff, 0xd9]);
    jpeg
}
