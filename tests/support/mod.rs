#![allow(dead_code)]

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use relic::prelude::*;
use relic::res::loader::encode_header;

/// A fresh scratch directory under the system temp dir, unique per process
/// and test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir()
        .join(format!("relic-tests-{}", process::id()))
        .join(name);

    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }

    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes one file, creating parent directories as needed.
pub fn write_file<T: AsRef<Path>>(path: T, bytes: &[u8]) {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent).unwrap();
    }

    fs::write(path, bytes).unwrap();
}

/// Builds a zip archive from `(name, bytes)` pairs.
pub fn make_zip<T: AsRef<Path>>(path: T, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options = ::zip::write::FileOptions::default();

    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }

    writer.finish().unwrap();
}

/// Builds a packed `*.rpk` container from `(name, bytes)` pairs.
pub fn make_pack<T: AsRef<Path>>(path: T, entries: &[(&str, &[u8])]) {
    let mut builder = PackBuilder::new();
    for (name, bytes) in entries {
        builder.add(*name, *bytes);
    }
    builder.save(path).unwrap();
}

/// A version marker entry accepted by the archive admission gate.
pub fn version_marker(version: u32) -> Vec<u8> {
    relic::archive::encode_version_marker(Endian::Little, version).to_vec()
}

/// A complete little-endian blob record: 64-byte header plus body.
pub fn blob_record(unique_id: u64, body: &[u8]) -> Vec<u8> {
    record(relic::res::assets::TAG_BLOB, 0, unique_id, body)
}

/// A complete little-endian binary record for an arbitrary tag.
pub fn record(type_tag: u32, version: u32, unique_id: u64, body: &[u8]) -> Vec<u8> {
    let init = ResourceInitData {
        path: String::new(),
        type_tag,
        version,
        unique_id,
        byte_order: Endian::Little,
        is_custom_asset: false,
        is_xml: false,
    };

    let mut buf = encode_header(&init).to_vec();
    buf.extend_from_slice(body);
    buf
}

/// The blob body of a loaded resource.
pub fn blob_bytes(resource: &Resource) -> Vec<u8> {
    match resource.payload() {
        AssetPayload::Blob(v) => v.bytes.clone(),
        other => panic!("expected a blob payload, got tag {:#010X}", other.type_tag()),
    }
}
