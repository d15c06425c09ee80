//! Plain-folder backing store, used for unpacked patch overlays during
//! development.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::errors::*;

use super::Store;

pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Opens a directory as a backing store.
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        let meta = fs::metadata(&path)?;
        if meta.is_dir() {
            Ok(DirStore {
                root: path.as_ref().to_owned(),
            })
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                "backing path is not a directory",
            )
            .into())
        }
    }

    fn visit(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                DirStore::visit(root, &path, out)?;
            } else if let Ok(relative) = path.strip_prefix(root) {
                if let Some(v) = relative.to_str() {
                    out.push(v.replace('\\', "/"));
                }
            }
        }

        Ok(())
    }
}

impl Store for DirStore {
    fn entries(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        DirStore::visit(&self.root, &self.root, &mut out)?;
        Ok(out)
    }

    fn read(&self, path: &str, buf: &mut Vec<u8>) -> Result<usize> {
        let mut file = fs::File::open(self.root.join(path))?;
        Ok(file.read_to_end(buf)?)
    }

    fn exists(&self, path: &str) -> bool {
        fs::metadata(self.root.join(path)).is_ok()
    }
}
