use std::collections::BTreeSet;
use std::path::PathBuf;

use homefeed::cache::MetadataDateCache;
use homefeed::dates::{DateResolver, DateSource, NoMetadata};
use homefeed::library::LibrarySettings;
use homefeed::scanner::{scan, MediaFilter};
use tempfile::tempdir;

use crate::support::write_file;

fn resolver() -> DateResolver {
    DateResolver::new(MetadataDateCache::in_memory(), Box::new(NoMetadata))
}

fn names(images: &[PathBuf]) -> Vec<String> {
    images
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (snapshot, summary) = scan(
        &[dir.path().to_path_buf()],
        &LibrarySettings::default(),
        &resolver(),
    );

    assert!(snapshot.is_empty());
    assert_eq!(summary.files_found, 0);
    assert_eq!(summary.folders_scanned, 1);
}

#[test]
fn test_scan_filters_by_extension_case_insensitively() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("IMG_0001.JPG"), b"a", 100);
    write_file(&dir.path().join("scan.Tiff"), b"b", 200);
    write_file(&dir.path().join("clip.MOV"), b"c", 300);
    write_file(&dir.path().join("readme.md"), b"d", 400);
    write_file(&dir.path().join("no_extension"), b"e", 500);
    write_file(&dir.path().join(".hidden.jpg"), b"f", 50);

    let (snapshot, _) = scan(
        &[dir.path().to_path_buf()],
        &LibrarySettings::default(),
        &resolver(),
    );

    assert_eq!(
        names(snapshot.images()),
        vec!["clip.MOV", "scan.Tiff", "IMG_0001.JPG", ".hidden.jpg"]
    );
}

#[test]
fn test_oversized_video_is_excluded() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("small.mp4"), &[0u8; 10], 100);
    write_file(&dir.path().join("large.mp4"), &[0u8; 100], 200);
    write_file(&dir.path().join("large.jpg"), &[0u8; 100], 300);

    let filter = MediaFilter::default().with_max_video_size(50);
    let settings = LibrarySettings::default().with_filter(filter);
    let (snapshot, _) = scan(&[dir.path().to_path_buf()], &settings, &resolver());

    assert_eq!(names(snapshot.images()), vec!["large.jpg", "small.mp4"]);
}

#[test]
fn test_custom_extension_lists() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"a", 100);
    write_file(&dir.path().join("b.raw"), b"b", 200);
    write_file(&dir.path().join("c.mp4"), b"c", 300);

    let filter = MediaFilter::new([".RAW"], Vec::<String>::new(), 1024);
    let settings = LibrarySettings::default().with_filter(filter);
    let (snapshot, _) = scan(&[dir.path().to_path_buf()], &settings, &resolver());

    assert_eq!(names(snapshot.images()), vec!["b.raw"]);
}

#[test]
fn test_multiple_folders_merge_into_one_listing() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(&a.path().join("one.jpg"), b"1", 100);
    write_file(&b.path().join("two.jpg"), b"2", 300);
    write_file(&a.path().join("sub/three.jpg"), b"3", 200);

    let folders = vec![a.path().to_path_buf(), b.path().to_path_buf()];
    let (snapshot, summary) = scan(&folders, &LibrarySettings::default(), &resolver());

    assert_eq!(names(snapshot.images()), vec!["two.jpg", "three.jpg", "one.jpg"]);
    assert_eq!(summary.folders_scanned, 2);

    let recorded: BTreeSet<_> = snapshot.folder_mtimes().keys().cloned().collect();
    let expected: BTreeSet<_> = folders.into_iter().collect();
    assert_eq!(recorded, expected);
    assert!(snapshot.folder_mtimes().values().all(|&m| m > 0.0));
}

#[test]
fn test_equal_dates_sorted_by_path() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("c.jpg"), b"c", 100);
    write_file(&dir.path().join("a.jpg"), b"a", 100);
    write_file(&dir.path().join("b.jpg"), b"b", 100);

    let (snapshot, _) = scan(
        &[dir.path().to_path_buf()],
        &LibrarySettings::default(),
        &resolver(),
    );
    assert_eq!(names(snapshot.images()), vec!["a.jpg", "b.jpg", "c.jpg"]);
}

#[test]
fn test_unicode_file_names() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("café.jpg"), b"a", 100);
    write_file(&dir.path().join("日本/写真.png"), b"b", 200);

    let (snapshot, _) = scan(
        &[dir.path().to_path_buf()],
        &LibrarySettings::default(),
        &resolver(),
    );
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.images_in_folder(&dir.path().join("日本")).len(), 1);
}

#[test]
fn test_date_source_ctime_is_used_without_metadata() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"a", 100);

    let settings = LibrarySettings::default().with_date_source(DateSource::Ctime);
    let (snapshot, _) = scan(&[dir.path().to_path_buf()], &settings, &resolver());

    assert_eq!(snapshot.date_source(), DateSource::Ctime);
    // Creation/change time is "now", not the back-dated mtime.
    let date = snapshot.effective_date(&dir.path().join("a.jpg")).unwrap();
    assert!(date > 100.0);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write_file(&dir.path().join("ok.jpg"), b"a", 100);
    let locked = dir.path().join("locked");
    write_file(&locked.join("hidden.jpg"), b"b", 200);
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    let (snapshot, _) = scan(
        &[dir.path().to_path_buf()],
        &LibrarySettings::default(),
        &resolver(),
    );

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    assert!(snapshot.images().contains(&dir.path().join("ok.jpg")));
}
