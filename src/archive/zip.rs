//! Zip-container backing store.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use crate::errors::*;

use super::Store;

pub struct ZipStore {
    // The zip reader seeks internally, so even read-only access needs
    // exclusive use of the underlying file.
    archive: Mutex<::zip::ZipArchive<fs::File>>,
}

impl ZipStore {
    /// Opens a zip file as a backing store.
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        let file = fs::File::open(path)?;
        let archive = ::zip::ZipArchive::new(file)?;
        Ok(ZipStore {
            archive: Mutex::new(archive),
        })
    }
}

impl Store for ZipStore {
    fn entries(&self) -> Result<Vec<String>> {
        let mut archive = self.archive.lock().unwrap();

        let mut out = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let name = entry.name();
            if !name.ends_with('/') {
                out.push(name.to_string());
            }
        }

        Ok(out)
    }

    fn read(&self, path: &str, buf: &mut Vec<u8>) -> Result<usize> {
        let mut archive = self.archive.lock().unwrap();
        let mut entry = archive.by_name(path)?;
        Ok(entry.read_to_end(buf)?)
    }

    fn exists(&self, path: &str) -> bool {
        self.archive.lock().unwrap().by_name(path).is_ok()
    }
}
