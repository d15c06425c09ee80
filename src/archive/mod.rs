//! Archives and patch layering.
//!
//! An [`Archive`] owns exactly one backing store and answers two questions:
//! does this content hash exist, and can you hand me its bytes. The backing
//! store is one of three kinds, inferred from the path: a packed read-only
//! container (`*.rpk`), a zip container (`*.zip`), or a plain folder used as
//! an unpacked patch overlay during development.
//!
//! Files are addressed by a 64-bit content hash of their normalized relative
//! path. Normalization (lower-case, forward slashes, no redundant segments)
//! and the hash function are fixed so that every archive feeding one
//! [`ArchiveManager`] agrees on file identity; this agreement is what makes
//! patch-over-base overrides work.
//!
//! All failures on the read path are non-fatal and surface as "absent". An
//! archive whose `load` failed stays unusable and indexes nothing.

pub mod dir;
pub mod manager;
pub mod pack;
pub mod zip;

pub use self::dir::DirStore;
pub use self::manager::ArchiveManager;
pub use self::pack::{PackBuilder, PackStore};
pub use self::zip::ZipStore;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::*;
use crate::res::cursor::Endian;
use crate::utils::{wildcard_match, FastHashMap, HashValue};

/// Relative path of the embedded marker entry carrying the game version an
/// archive was built for. Required for base archives, optional for patches.
pub const VERSION_ENTRY: &str = "version";

/// A backing container of files. Implementations enumerate their entries as
/// relative paths and perform sequential reads of one entry.
pub trait Store: Send + Sync {
    /// Enumerates every entry in this container, as stored (un-normalized)
    /// relative paths.
    fn entries(&self) -> Result<Vec<String>>;

    /// Reads the entry at the stored path `path`, appending its bytes into
    /// `buf`. Returns the number of bytes read.
    fn read(&self, path: &str, buf: &mut Vec<u8>) -> Result<usize>;

    /// Returns whether the stored path exists in this container.
    fn exists(&self, path: &str) -> bool;
}

/// The kind of backing store behind an [`Archive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Pack,
    Zip,
    Directory,
}

impl Backend {
    /// Infers the backend kind from a backing path's extension.
    pub fn infer<T: AsRef<Path>>(path: T) -> Backend {
        match path
            .as_ref()
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            Some("rpk") => Backend::Pack,
            Some("zip") => Backend::Zip,
            _ => Backend::Directory,
        }
    }
}

/// Normalizes a logical path: backslashes become forward slashes, characters
/// are lower-cased, and empty / `.` segments are dropped.
pub fn normalize<T: AsRef<str>>(path: T) -> String {
    let lowered = path.as_ref().to_lowercase().replace('\\', "/");

    let mut out = String::with_capacity(lowered.len());
    for segment in lowered.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }

        if !out.is_empty() {
            out.push('/');
        }

        out.push_str(segment);
    }

    out
}

/// Parses a version marker entry: 1 byte endianness (0 little, 1 big)
/// followed by the game version as u32.
pub fn parse_version_marker(buf: &[u8]) -> Result<u32> {
    if buf.len() < 5 {
        return Err(Error::DecodeMalformed(
            "version marker shorter than 5 bytes".into(),
        ));
    }

    match buf[0] {
        0 => Ok(LittleEndian::read_u32(&buf[1..5])),
        1 => Ok(BigEndian::read_u32(&buf[1..5])),
        v => Err(Error::DecodeMalformed(format!(
            "version marker has unknown byte order {}",
            v
        ))),
    }
}

/// Encodes a version marker entry.
pub fn encode_version_marker(order: Endian, version: u32) -> [u8; 5] {
    let mut buf = [0; 5];
    match order {
        Endian::Big => {
            buf[0] = 1;
            BigEndian::write_u32(&mut buf[1..5], version);
        }
        _ => {
            buf[0] = 0;
            LittleEndian::write_u32(&mut buf[1..5], version);
        }
    }
    buf
}

/// One discoverable file inside an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub hash: HashValue<str>,
    pub path: String,
}

/// The raw bytes of one archive entry, produced per load and never cached
/// itself; only the decoded resource is.
#[derive(Debug)]
pub struct RawFile {
    pub bytes: Box<[u8]>,
    pub path: String,
    pub archive: Weak<Archive>,
}

struct Indexed {
    path: String,
    store_path: String,
}

/// One backing store plus its content index.
pub struct Archive {
    backing_path: PathBuf,
    backend: Backend,
    store: Option<Box<dyn Store>>,
    game_version: Option<u32>,
    index: FastHashMap<HashValue<str>, Indexed>,
}

impl Archive {
    /// Creates an unloaded archive over `path`, inferring the backend kind
    /// from the extension.
    pub fn new<T: Into<PathBuf>>(path: T) -> Self {
        let backing_path = path.into();
        let backend = Backend::infer(&backing_path);
        Archive::with_backend(backing_path, backend)
    }

    /// Creates an unloaded archive over `path` with an explicit backend.
    pub fn with_backend<T: Into<PathBuf>>(path: T, backend: Backend) -> Self {
        Archive {
            backing_path: path.into(),
            backend,
            store: None,
            game_version: None,
            index: FastHashMap::default(),
        }
    }

    /// Opens the backing store, enumerates every contained entry into the
    /// content index, and reads the embedded version marker if present.
    ///
    /// On failure the archive stays unloaded and registers nothing.
    pub fn load(&mut self) -> Result<()> {
        if self.store.is_some() {
            return Ok(());
        }

        let store: Box<dyn Store> = match self.backend {
            Backend::Pack => Box::new(PackStore::open(&self.backing_path)?),
            Backend::Zip => Box::new(ZipStore::open(&self.backing_path)?),
            Backend::Directory => Box::new(DirStore::open(&self.backing_path)?),
        };

        let mut index = FastHashMap::default();
        for store_path in store.entries()? {
            let path = normalize(&store_path);
            if path.is_empty() {
                continue;
            }

            index.insert(
                HashValue::from(path.as_str()),
                Indexed { path, store_path },
            );
        }

        let mut game_version = None;
        if let Some(entry) = index.get(&HashValue::from(VERSION_ENTRY)) {
            let mut buf = Vec::new();
            store.read(&entry.store_path, &mut buf)?;
            game_version = Some(parse_version_marker(&buf)?);
        }

        info!(
            "[Archive] loads {:?} ({:?}, {} entries, version {:?}).",
            self.backing_path,
            self.backend,
            index.len(),
            game_version
        );

        self.store = Some(store);
        self.index = index;
        self.game_version = game_version;
        Ok(())
    }

    /// Releases the backing store and clears the index.
    pub fn unload(&mut self) {
        self.store = None;
        self.index.clear();
        self.game_version = None;
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.store.is_some()
    }

    #[inline]
    pub fn backing_path(&self) -> &Path {
        &self.backing_path
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The game version this archive was built for, if it carries a marker.
    #[inline]
    pub fn game_version(&self) -> Option<u32> {
        self.game_version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns whether the content hash exists in this archive.
    #[inline]
    pub fn contains<T: Into<HashValue<str>>>(&self, hash: T) -> bool {
        self.index.contains_key(&hash.into())
    }

    /// Returns the normalized path behind a content hash.
    #[inline]
    pub fn path_of<T: Into<HashValue<str>>>(&self, hash: T) -> Option<&str> {
        self.index.get(&hash.into()).map(|v| v.path.as_str())
    }

    /// Sequentially reads one entry out of `archive`. Absent if the archive
    /// is not loaded or the entry does not exist; read failures are logged
    /// and also absent.
    ///
    /// Takes the shared handle rather than `&self` so the produced
    /// [`RawFile`] can point back at its owning archive.
    pub fn load_file_raw<T>(archive: &Arc<Archive>, hash: T) -> Option<RawFile>
    where
        T: Into<HashValue<str>>,
    {
        let store = archive.store.as_ref()?;
        let entry = archive.index.get(&hash.into())?;

        let mut buf = Vec::new();
        match store.read(&entry.store_path, &mut buf) {
            Ok(_) => Some(RawFile {
                bytes: buf.into_boxed_slice(),
                path: entry.path.clone(),
                archive: Arc::downgrade(archive),
            }),
            Err(err) => {
                warn!(
                    "[Archive] failed to read '{}' from {:?}: {}.",
                    entry.path, archive.backing_path, err
                );
                None
            }
        }
    }

    /// Lists entries whose normalized path matches the shell-style wildcard
    /// `filter`. `None` lists everything.
    pub fn list_files(&self, filter: Option<&str>) -> Vec<IndexEntry> {
        let filter = filter.map(normalize);
        self.index
            .iter()
            .filter(|(_, v)| match filter {
                Some(ref pattern) => wildcard_match(pattern, &v.path),
                None => true,
            })
            .map(|(&hash, v)| IndexEntry {
                hash,
                path: v.path.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalizes() {
        assert_eq!(normalize("Textures\\Sky.TEX"), "textures/sky.tex");
        assert_eq!(normalize("./textures//sky.tex"), "textures/sky.tex");
        assert_eq!(normalize("/textures/./sky.tex"), "textures/sky.tex");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn backend_inference() {
        assert_eq!(Backend::infer("base.rpk"), Backend::Pack);
        assert_eq!(Backend::infer("patch.ZIP"), Backend::Zip);
        assert_eq!(Backend::infer("overlay"), Backend::Directory);
        assert_eq!(Backend::infer("overlay.d"), Backend::Directory);
    }

    #[test]
    fn version_marker_round_trip() {
        for &order in &[Endian::Little, Endian::Big] {
            let buf = encode_version_marker(order, 1042);
            assert_eq!(parse_version_marker(&buf).unwrap(), 1042);
        }

        assert!(parse_version_marker(&[0, 1]).is_err());
        assert!(parse_version_marker(&[9, 0, 0, 0, 0]).is_err());
    }
}
