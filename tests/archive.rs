mod support;

use std::fs;
use std::sync::Arc;

use relic::prelude::*;

use support::*;

#[test]
fn directory_backend() {
    let dir = scratch_dir("directory-backend");
    write_file(dir.join("Textures/Sky.TEX"), b"sky");
    write_file(dir.join("props/crate.mdl"), b"crate");

    let mut archive = Archive::new(&dir);
    assert!(!archive.is_loaded());
    archive.load().unwrap();
    assert!(archive.is_loaded());
    assert_eq!(archive.backend(), Backend::Directory);
    assert_eq!(archive.len(), 2);

    // The index is keyed by hashes of normalized paths regardless of the
    // on-disk casing; un-normalized lookups are the caller's bug.
    assert!(archive.contains("textures/sky.tex"));
    assert!(archive.contains(HashValue::from("textures/sky.tex")));
    assert!(!archive.contains("textures/sea.tex"));
    assert_eq!(archive.path_of("props/crate.mdl"), Some("props/crate.mdl"));

    let archive = Arc::new(archive);
    let raw = Archive::load_file_raw(&archive, "textures/sky.tex").unwrap();
    assert_eq!(&*raw.bytes, b"sky");
    assert_eq!(raw.path, "textures/sky.tex");
    assert!(raw.archive.upgrade().is_some());
}

#[test]
fn zip_backend() {
    let dir = scratch_dir("zip-backend");
    let path = dir.join("content.zip");
    make_zip(&path, &[("foo/mock.prefab", b"mock"), ("bar.txt", b"hello")]);

    let mut archive = Archive::new(&path);
    archive.load().unwrap();
    assert_eq!(archive.backend(), Backend::Zip);
    assert_eq!(archive.len(), 2);

    let archive = Arc::new(archive);
    let raw = Archive::load_file_raw(&archive, "foo/mock.prefab").unwrap();
    assert_eq!(&*raw.bytes, b"mock");
}

#[test]
fn pack_backend() {
    let dir = scratch_dir("pack-backend");
    let path = dir.join("base.rpk");
    make_pack(&path, &[("a.bin", b"aaa"), ("nested/b.bin", b"bbb")]);

    let mut archive = Archive::new(&path);
    archive.load().unwrap();
    assert_eq!(archive.backend(), Backend::Pack);

    let archive = Arc::new(archive);
    assert_eq!(
        &*Archive::load_file_raw(&archive, "a.bin").unwrap().bytes,
        b"aaa"
    );
    assert_eq!(
        &*Archive::load_file_raw(&archive, "nested/b.bin").unwrap().bytes,
        b"bbb"
    );
    assert!(Archive::load_file_raw(&archive, "missing.bin").is_none());
}

#[test]
fn version_marker_is_read() {
    let dir = scratch_dir("version-marker");
    let path = dir.join("base.rpk");
    make_pack(
        &path,
        &[("version", &version_marker(3)), ("a.bin", b"aaa")],
    );

    let mut archive = Archive::new(&path);
    archive.load().unwrap();
    assert_eq!(archive.game_version(), Some(3));

    // An archive without the marker simply has no version.
    let path = dir.join("patch.rpk");
    make_pack(&path, &[("a.bin", b"patched")]);
    let mut archive = Archive::new(&path);
    archive.load().unwrap();
    assert_eq!(archive.game_version(), None);
}

#[test]
fn failed_load_registers_nothing() {
    let dir = scratch_dir("failed-load");

    let mut archive = Archive::new(dir.join("missing.rpk"));
    assert!(archive.load().is_err());
    assert!(!archive.is_loaded());
    assert_eq!(archive.len(), 0);

    // A pack with a broken magic is rejected the same way.
    let path = dir.join("corrupt.rpk");
    write_file(&path, b"garbage");
    let mut archive = Archive::new(&path);
    assert!(archive.load().is_err());
    assert!(!archive.is_loaded());
}

#[test]
fn unloaded_archive_reads_nothing() {
    let dir = scratch_dir("unloaded-reads");
    write_file(dir.join("a.bin"), b"aaa");

    let archive = Arc::new(Archive::new(&dir));
    assert!(Archive::load_file_raw(&archive, "a.bin").is_none());
}

#[test]
fn list_files_with_wildcard() {
    let dir = scratch_dir("list-files");
    write_file(dir.join("textures/sky.tex"), b"s");
    write_file(dir.join("textures/sea.tex"), b"s");
    write_file(dir.join("props/crate.mdl"), b"c");

    let mut archive = Archive::new(&dir);
    archive.load().unwrap();

    assert_eq!(archive.list_files(None).len(), 3);
    assert_eq!(archive.list_files(Some("textures/*")).len(), 2);
    assert_eq!(archive.list_files(Some("*.mdl")).len(), 1);
    assert!(archive.list_files(Some("audio/*")).is_empty());
}

#[test]
fn stores_answer_directly() {
    use relic::archive::{DirStore, Store, ZipStore};

    let dir = scratch_dir("direct-stores");
    write_file(dir.join("mock.txt"), b"Hello, World!");

    assert!(DirStore::open(dir.join("_invalid_path_")).is_err());

    let fs = DirStore::open(&dir).unwrap();
    assert!(fs.exists("mock.txt"));
    assert!(!fs.exists("other.txt"));

    let mut buf = Vec::new();
    fs.read("mock.txt", &mut buf).unwrap();
    assert_eq!(buf, b"Hello, World!");

    let zip_path = dir.join("mock.zip");
    make_zip(&zip_path, &[("foo/mock.prefab", b"mock")]);

    let fs = ZipStore::open(&zip_path).unwrap();
    assert!(fs.exists("foo/mock.prefab"));
    assert!(!fs.exists("foo/other.prefab"));

    let mut buf = Vec::new();
    fs.read("foo/mock.prefab", &mut buf).unwrap();
    assert_eq!(buf, b"mock");
}

#[test]
fn unload_clears_the_index() {
    let dir = scratch_dir("unload-clears");
    write_file(dir.join("a.bin"), b"aaa");

    let mut archive = Archive::new(&dir);
    archive.load().unwrap();
    assert_eq!(archive.len(), 1);

    archive.unload();
    assert!(!archive.is_loaded());
    assert_eq!(archive.len(), 0);

    let _ = fs::remove_dir_all(&dir);
}
