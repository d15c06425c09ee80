//! Merges an ordered list of archives into one addressable namespace.

use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::*;
use crate::utils::{wildcard_match, FastHashMap, FastHashSet, HashValue};

use super::{normalize, Archive, RawFile};

struct Merged {
    path: String,
    archive: usize,
}

/// An ordered set of archives (one base plus zero or more patch layers) and
/// the merged index over all of them.
///
/// When two archives contain the same content hash, the archive added last
/// owns it. Patches therefore override base assets simply by being added
/// after the base, with no per-file versioning.
///
/// Admission is the only hard validation gate in the subsystem: an archive
/// that fails to open, or whose version marker falls outside the accepted
/// set, is rejected and contributes nothing to the merged index.
pub struct ArchiveManager {
    archives: Vec<Arc<Archive>>,
    merged: FastHashMap<HashValue<str>, Merged>,
    accepted_versions: FastHashSet<u32>,
}

impl ArchiveManager {
    /// Creates an empty manager that accepts any game version.
    pub fn new() -> Self {
        ArchiveManager {
            archives: Vec::new(),
            merged: FastHashMap::default(),
            accepted_versions: FastHashSet::default(),
        }
    }

    /// Creates an empty manager gated on the given game versions.
    pub fn with_accepted_versions<I: IntoIterator<Item = u32>>(versions: I) -> Self {
        let mut manager = ArchiveManager::new();
        manager.accepted_versions = versions.into_iter().collect();
        manager
    }

    /// Adds a game version to the accepted set. Affects archives added from
    /// now on; already-admitted archives are not re-validated.
    pub fn accept_version(&mut self, version: u32) {
        self.accepted_versions.insert(version);
    }

    /// The admitted archives, in add order. Index 0 is the base.
    #[inline]
    pub fn archives(&self) -> &[Arc<Archive>] {
        &self.archives
    }

    /// Returns whether at least one archive has been admitted.
    #[inline]
    pub fn has_loaded_archives(&self) -> bool {
        !self.archives.is_empty()
    }

    /// The number of distinct content hashes in the merged index.
    #[inline]
    pub fn file_count(&self) -> usize {
        self.merged.len()
    }

    /// Constructs and loads an archive over `path` (backend inferred from
    /// the extension), validates its version, and merges its entries with
    /// last-added-wins precedence.
    ///
    /// A base archive (the first one admitted) must carry a version marker
    /// inside the accepted set whenever that set is non-empty; patch archives
    /// may omit the marker.
    pub fn add_archive<T: Into<PathBuf>>(&mut self, path: T) -> Result<Arc<Archive>> {
        let mut archive = Archive::new(path);

        if let Err(err) = archive.load() {
            warn!(
                "[ArchiveManager] rejects {:?}: {}.",
                archive.backing_path(),
                err
            );
            return Err(Error::ArchiveOpenFailed(archive.backing_path().to_owned()));
        }

        if !self.accepted_versions.is_empty() {
            let admitted = match archive.game_version() {
                Some(v) => self.accepted_versions.contains(&v),
                // Only patch layers may omit the version marker.
                None => !self.archives.is_empty(),
            };

            if !admitted {
                warn!(
                    "[ArchiveManager] rejects {:?}: game version {:?} is outside the accepted set.",
                    archive.backing_path(),
                    archive.game_version()
                );
                return Err(Error::VersionRejected(
                    archive.backing_path().to_owned(),
                    archive.game_version(),
                ));
            }
        }

        let slot = self.archives.len();
        let archive = Arc::new(archive);

        for entry in archive.list_files(None) {
            self.merged.insert(
                entry.hash,
                Merged {
                    path: entry.path,
                    archive: slot,
                },
            );
        }

        info!(
            "[ArchiveManager] admits {:?} as layer {} ({} entries).",
            archive.backing_path(),
            slot,
            archive.len()
        );

        self.archives.push(archive.clone());
        Ok(archive)
    }

    /// Unloads every archive and clears the merged index, then re-adds each
    /// supplied archive in order. Used for hot-swapping the whole archive set
    /// without destroying the manager; individual rejections are logged and
    /// skipped.
    pub fn set_archives<I, T>(&mut self, paths: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<PathBuf>,
    {
        self.unload_all();

        for path in paths {
            let _ = self.add_archive(path);
        }
    }

    /// Unloads every archive and clears the merged index.
    pub fn unload_all(&mut self) {
        self.merged.clear();

        for archive in self.archives.drain(..) {
            // Outstanding references keep the backing store open until they
            // are released.
            if let Ok(mut archive) = Arc::try_unwrap(archive) {
                archive.unload();
            }
        }
    }

    /// Returns whether the content hash resolves in the merged index.
    #[inline]
    pub fn contains<T: Into<HashValue<str>>>(&self, hash: T) -> bool {
        self.merged.contains_key(&hash.into())
    }

    /// The normalized path behind a merged content hash.
    #[inline]
    pub fn path_of<T: Into<HashValue<str>>>(&self, hash: T) -> Option<&str> {
        self.merged.get(&hash.into()).map(|v| v.path.as_str())
    }

    /// The archive that currently owns a content hash, honoring override
    /// precedence.
    pub fn archive_for<T: Into<HashValue<str>>>(&self, hash: T) -> Option<&Arc<Archive>> {
        self.merged
            .get(&hash.into())
            .map(|v| &self.archives[v.archive])
    }

    /// Reads one file by logical path. The path is normalized and hashed,
    /// then served by the highest-priority archive containing it.
    pub fn load_file<T: AsRef<str>>(&self, path: T) -> Option<RawFile> {
        self.load_file_by_hash(HashValue::from(normalize(path)))
    }

    /// Reads one file by content hash.
    pub fn load_file_by_hash(&self, hash: HashValue<str>) -> Option<RawFile> {
        let merged = self.merged.get(&hash)?;
        Archive::load_file_raw(&self.archives[merged.archive], hash)
    }

    /// Lists the normalized paths in the merged (post-override) index that
    /// match the shell-style wildcard `filter`.
    pub fn list_files<T: AsRef<str>>(&self, filter: T) -> Vec<String> {
        let pattern = normalize(filter);

        let mut out: Vec<_> = self
            .merged
            .values()
            .filter(|v| wildcard_match(&pattern, &v.path))
            .map(|v| v.path.clone())
            .collect();

        out.sort();
        out
    }
}

impl Default for ArchiveManager {
    fn default() -> Self {
        ArchiveManager::new()
    }
}
