//! The packed read-only container (`*.rpk`).
//!
//! On-disk layout: an 8-byte magic, a bincode-encoded entry table, then the
//! raw blob data. Entry offsets are relative to the end of the table, so the
//! table can be written without knowing its own encoded size.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use bincode;

use crate::errors::*;
use crate::utils::FastHashMap;

use super::Store;

pub const MAGIC: [u8; 8] = [b'R', b'P', b'A', b'K', b' ', 0, 0, 1];

#[derive(Serialize, Deserialize, Debug, Clone)]
struct PackEntry {
    path: String,
    offset: u64,
    len: u64,
}

pub struct PackStore {
    file: Mutex<fs::File>,
    data_offset: u64,
    entries: FastHashMap<String, (u64, u64)>,
}

impl PackStore {
    /// Opens a packed container, reading the entry table eagerly and leaving
    /// blob data on disk until entries are read.
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        let mut file = fs::File::open(path)?;

        let mut magic = [0; 8];
        file.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::DecodeMalformed("pack magic mismatch".into()));
        }

        let table: Vec<PackEntry> = bincode::deserialize_from(&mut file)?;
        let data_offset = file.seek(SeekFrom::Current(0))?;

        let mut entries = FastHashMap::default();
        for v in table {
            entries.insert(v.path, (v.offset, v.len));
        }

        Ok(PackStore {
            file: Mutex::new(file),
            data_offset,
            entries,
        })
    }
}

impl Store for PackStore {
    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn read(&self, path: &str, buf: &mut Vec<u8>) -> Result<usize> {
        let &(offset, len) = self
            .entries
            .get(path)
            .ok_or_else(|| Error::EntryNotFound(path.to_string()))?;

        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(self.data_offset + offset))?;

        let start = buf.len();
        buf.resize(start + len as usize, 0);
        file.read_exact(&mut buf[start..])?;
        Ok(len as usize)
    }

    fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }
}

/// Writer counterpart of [`PackStore`], used by build tooling and tests to
/// produce `*.rpk` containers.
#[derive(Default)]
pub struct PackBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl PackBuilder {
    pub fn new() -> Self {
        PackBuilder {
            entries: Vec::new(),
        }
    }

    /// Appends one entry. Paths are stored as given; readers normalize.
    pub fn add<T1, T2>(&mut self, path: T1, bytes: T2) -> &mut Self
    where
        T1: Into<String>,
        T2: Into<Vec<u8>>,
    {
        self.entries.push((path.into(), bytes.into()));
        self
    }

    /// Writes the container to `path`, replacing any existing file.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let mut table = Vec::with_capacity(self.entries.len());
        let mut offset = 0u64;
        for (path, bytes) in &self.entries {
            table.push(PackEntry {
                path: path.clone(),
                offset,
                len: bytes.len() as u64,
            });
            offset += bytes.len() as u64;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(&MAGIC)?;
        bincode::serialize_into(&mut file, &table)?;

        for (_, bytes) in &self.entries {
            file.write_all(bytes)?;
        }

        Ok(())
    }
}
