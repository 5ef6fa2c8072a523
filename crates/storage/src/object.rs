use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

/// Key/value blob store with last-write-wins semantics. The sync layer is
/// the only caller; it treats a missing key as first-run state, not an
/// error.
pub trait ObjectStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Replaces the value under `key`. A failed put must leave the previous
    /// value readable — no truncated blobs.
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// Replaces several keys as one logical write: on failure, no key may be
    /// left updated while another kept its old value. Required rather than
    /// defaulted — a plain put-loop would publish earlier keys before a
    /// later failure, and every store has to stage in its own way.
    fn put_many(&self, objects: &[(&str, &[u8])]) -> io::Result<()>;
}

/// Filesystem-backed store: one file per key under a root directory.
/// Writes go to a temp file in the same directory and are renamed into
/// place, so readers never observe a partial file.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(LocalStore { root })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn stage(&self, bytes: &[u8]) -> io::Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }
}

impl ObjectStore for LocalStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let tmp = self.stage(bytes)?;
        tmp.persist(self.path(key)).map_err(|e| e.error)?;
        debug!(key, len = bytes.len(), "stored object");
        Ok(())
    }

    fn put_many(&self, objects: &[(&str, &[u8])]) -> io::Result<()> {
        // Stage every payload fully before the first rename, so a write
        // failure leaves all previous values in place.
        let mut staged = Vec::with_capacity(objects.len());
        for (key, bytes) in objects {
            staged.push((*key, self.stage(bytes)?));
        }
        for (key, tmp) in staged {
            tmp.persist(self.path(key)).map_err(|e| e.error)?;
            debug!(key, "stored object");
        }
        Ok(())
    }
}
