use std::sync::Arc;
use std::thread;
use std::time::Duration;

use homefeed::cache::MetadataDateCache;
use homefeed::dates::DateSource;
use homefeed::library::{InvalidReason, LibrarySettings, Validity};
use tempfile::tempdir;

use crate::support::{touch_dir, write_file, Fixture, TableExtractor};

#[test]
fn test_embedded_date_beats_filesystem_date() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"no exif", 100);
    write_file(&dir.path().join("b.jpg"), b"has exif", 50);

    let extractor = TableExtractor::new(&[("b.jpg", 200.0)]);
    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        extractor,
    );

    let ctx = fx.library.context();
    let snapshot = fx.library.snapshot(&ctx);
    assert_eq!(
        snapshot.images(),
        &[dir.path().join("b.jpg"), dir.path().join("a.jpg")]
    );
    assert_eq!(snapshot.effective_date(&dir.path().join("a.jpg")), Some(100.0));
    assert_eq!(snapshot.effective_date(&dir.path().join("b.jpg")), Some(200.0));
}

#[test]
fn test_reads_within_ttl_do_not_rescan() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"a", 100);
    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );

    for _ in 0..5 {
        assert_eq!(fx.all_images().len(), 1);
    }
    fx.library.get_leaf_folders(&fx.library.context());
    fx.library
        .get_images_by_folder(&fx.library.context(), dir.path());
    assert_eq!(fx.library.scan_count(), 1);
}

#[test]
fn test_folder_images_are_a_subsequence_of_all_images() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("x/1.jpg"), b"1", 500);
    write_file(&dir.path().join("y/2.jpg"), b"2", 400);
    write_file(&dir.path().join("x/3.png"), b"3", 300);
    write_file(&dir.path().join("x/deep/4.jpg"), b"4", 600);
    write_file(&dir.path().join("x/5.jpg"), b"5", 100);

    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );
    let ctx = fx.library.context();
    let all = fx.library.get_all_images(&ctx);
    let x = fx.library.get_images_by_folder(&ctx, &dir.path().join("x"));

    assert_eq!(
        x,
        vec![
            dir.path().join("x/1.jpg"),
            dir.path().join("x/3.png"),
            dir.path().join("x/5.jpg"),
        ]
    );
    let filtered: Vec<_> = all
        .iter()
        .filter(|p| p.parent() == Some(dir.path().join("x").as_path()))
        .cloned()
        .collect();
    assert_eq!(x, filtered);

    // A `.` component names the same folder.
    let spelled = dir.path().join("x").join(".");
    assert_eq!(fx.library.get_images_by_folder(&ctx, &spelled), x);
}

#[test]
fn test_date_source_change_invalidates() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"a", 100);
    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );

    fx.all_images();
    fx.settings.set_date_source(DateSource::Ctime);
    let ctx = fx.library.context();
    assert!(matches!(
        fx.library.validity(&ctx),
        Validity::Invalid(InvalidReason::DateSourceChanged { .. })
    ));

    fx.all_images();
    assert_eq!(fx.library.scan_count(), 2);
    assert!(fx.library.validity(&fx.library.context()).is_valid());
}

#[test]
fn test_touched_folder_triggers_rescan() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"a", 100);
    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );
    assert_eq!(fx.all_images().len(), 1);

    write_file(&dir.path().join("b.jpg"), b"b", 200);
    let future = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
        + 3600;
    touch_dir(dir.path(), future);

    assert!(matches!(
        fx.library.validity(&fx.library.context()),
        Validity::Invalid(InvalidReason::FolderModified { .. })
    ));
    assert_eq!(fx.all_images().len(), 2);
    assert_eq!(fx.library.scan_count(), 2);
}

#[test]
fn test_folder_removal_and_readdition() {
    let lib_a = tempdir().unwrap();
    let lib_b = tempdir().unwrap();
    write_file(&lib_a.path().join("a.jpg"), b"a", 100);
    write_file(&lib_b.path().join("b.jpg"), b"b", 200);

    let fx = Fixture::new(
        vec![lib_a.path().to_path_buf(), lib_b.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );
    assert_eq!(fx.all_images().len(), 2);

    assert!(fx.folders.remove(lib_b.path()));
    assert_eq!(fx.all_images(), vec![lib_a.path().join("a.jpg")]);

    fx.library.invalidate_cache();
    fx.folders.add(lib_b.path());
    assert_eq!(fx.all_images().len(), 2);
    assert_eq!(fx.library.scan_count(), 3);
}

#[test]
fn test_missing_folder_is_not_an_error() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"a", 100);
    let missing = dir.path().join("unplugged-drive");

    let fx = Fixture::new(
        vec![missing.clone(), dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );
    let snapshot = fx.library.snapshot(&fx.library.context());

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.folder_mtimes().get(&missing), Some(&0.0));
    assert_eq!(fx.library.last_summary().unwrap().folders_missing, 1);

    // Still missing: the snapshot stays valid.
    assert!(fx.library.validity(&fx.library.context()).is_valid());
}

#[test]
fn test_expired_snapshot_rescans() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.jpg"), b"a", 100);
    let settings = LibrarySettings::default().with_cache_ttl(Duration::ZERO);
    let fx = Fixture::with_settings(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
        settings,
    );

    fx.all_images();
    thread::sleep(Duration::from_millis(20));
    fx.all_images();
    assert_eq!(fx.library.scan_count(), 2);
}

#[test]
fn test_leaf_folders() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("2023/a.jpg"), b"a", 100);
    write_file(&dir.path().join("2023/b.jpg"), b"b", 300);
    write_file(&dir.path().join("2024/c.mp4"), b"c", 200);
    write_file(&dir.path().join("notes.txt"), b"n", 900);

    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );
    let leaves = fx.library.get_leaf_folders(&fx.library.context());

    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].name, "2023");
    assert_eq!(leaves[0].count, 2);
    assert_eq!(leaves[0].newest_effective_date, 300.0);
    assert_eq!(leaves[1].name, "2024");
    assert_eq!(leaves[1].count, 1);

    let total: usize = leaves.iter().map(|l| l.count).sum();
    assert_eq!(total, fx.all_images().len());
}

#[test]
fn test_concurrent_readers_share_one_scan() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write_file(&dir.path().join(format!("{i}.jpg")), b"x", 100 + i);
    }
    let fx = Arc::new(Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let fx = Arc::clone(&fx);
            thread::spawn(move || fx.all_images().len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 20);
    }
    assert_eq!(fx.library.scan_count(), 1);
}

#[test]
fn test_touched_subdirectory_triggers_rescan() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("2024/a.jpg"), b"a", 100);
    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );
    assert_eq!(fx.all_images().len(), 1);

    // Only the immediate subdirectory changes; the root keeps its mtime.
    write_file(&dir.path().join("2024/b.jpg"), b"b", 200);
    let future = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
        + 3600;
    touch_dir(&dir.path().join("2024"), future);

    assert!(matches!(
        fx.library.validity(&fx.library.context()),
        Validity::Invalid(InvalidReason::FolderModified { .. })
    ));
    assert_eq!(fx.all_images().len(), 2);
    assert_eq!(fx.library.scan_count(), 2);
}

#[cfg(target_os = "linux")]
#[test]
fn test_folders_differing_only_in_normal_form_stay_separate() {
    let dir = tempdir().unwrap();
    let nfc = dir.path().join("caf\u{e9}");
    let nfd = dir.path().join("cafe\u{301}");
    write_file(&nfc.join("a.jpg"), b"a", 100);
    write_file(&nfd.join("b.jpg"), b"b", 200);

    let fx = Fixture::new(
        vec![dir.path().to_path_buf()],
        MetadataDateCache::in_memory(),
        TableExtractor::default(),
    );
    let ctx = fx.library.context();

    assert_eq!(
        fx.library.get_images_by_folder(&ctx, &nfd),
        vec![nfd.join("b.jpg")]
    );
    assert_eq!(
        fx.library.get_images_by_folder(&ctx, &nfc),
        vec![nfc.join("a.jpg")]
    );
    assert_eq!(fx.library.get_leaf_folders(&ctx).len(), 2);
}
