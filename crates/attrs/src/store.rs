//! Opaque per-file attribute store

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// An open file plus the path it was opened from.
///
/// Attribute operations are fd-based where the backend supports it; the
/// path identifies the same file for backends that cannot key on a
/// descriptor.
#[derive(Debug)]
pub struct FileHandle {
    file: File,
    path: PathBuf,
}

impl FileHandle {
    #[must_use]
    pub fn new(file: File, path: impl Into<PathBuf>) -> Self {
        Self {
            file,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Per-file key/value metadata facility, independent of file content.
///
/// The verification engine treats this as opaque; implementations map it
/// onto filesystem extended attributes or, for tests and filesystems
/// without xattr support, onto memory.
pub trait AttrStore: Send + Sync {
    /// Read one attribute value, `None` when absent.
    ///
    /// # Errors
    /// Returns the backend's I/O error when the lookup itself fails.
    fn get(&self, file: &FileHandle, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Set one attribute value.
    ///
    /// # Errors
    /// Returns the backend's I/O error when the write fails.
    fn set(&self, file: &FileHandle, key: &str, value: &[u8]) -> io::Result<()>;

    /// Remove one attribute. Removing an absent attribute is an error,
    /// matching xattr semantics.
    ///
    /// # Errors
    /// Returns the backend's I/O error when the removal fails.
    fn remove(&self, file: &FileHandle, key: &str) -> io::Result<()>;
}

/// Real extended-attribute backend, fd-based.
#[derive(Debug, Clone, Copy, Default)]
pub struct XattrStore;

impl AttrStore for XattrStore {
    fn get(&self, file: &FileHandle, key: &str) -> io::Result<Option<Vec<u8>>> {
        use xattr::FileExt;
        file.file().get_xattr(key)
    }

    fn set(&self, file: &FileHandle, key: &str, value: &[u8]) -> io::Result<()> {
        use xattr::FileExt;
        file.file().set_xattr(key, value)
    }

    fn remove(&self, file: &FileHandle, key: &str) -> io::Result<()> {
        use xattr::FileExt;
        file.file().remove_xattr(key)
    }
}

/// In-memory attribute store keyed by path.
///
/// Used by tests and usable on filesystems without xattr support; shares
/// the real backend's semantics, including the error on removing an
/// absent key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(PathBuf, String), Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored for one path, in no particular order.
    #[must_use]
    pub fn keys_for(&self, path: &Path) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .keys()
                    .filter(|(p, _)| p == path)
                    .map(|(_, k)| k.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl AttrStore for MemoryStore {
    fn get(&self, file: &FileHandle, key: &str) -> io::Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::other("attribute store lock poisoned"))?;
        Ok(entries
            .get(&(file.path().to_path_buf(), key.to_string()))
            .cloned())
    }

    fn set(&self, file: &FileHandle, key: &str, value: &[u8]) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::other("attribute store lock poisoned"))?;
        entries.insert((file.path().to_path_buf(), key.to_string()), value.to_vec());
        Ok(())
    }

    fn remove(&self, file: &FileHandle, key: &str) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::other("attribute store lock poisoned"))?;
        match entries.remove(&(file.path().to_path_buf(), key.to_string())) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no attribute {key}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn handle(temp: &NamedTempFile) -> FileHandle {
        let file = File::open(temp.path()).unwrap();
        FileHandle::new(file, temp.path())
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let temp = NamedTempFile::new().unwrap();
        let file = handle(&temp);
        let store = MemoryStore::new();

        assert_eq!(store.get(&file, "user.test").unwrap(), None);

        store.set(&file, "user.test", b"value").unwrap();
        assert_eq!(
            store.get(&file, "user.test").unwrap(),
            Some(b"value".to_vec())
        );

        store.remove(&file, "user.test").unwrap();
        assert_eq!(store.get(&file, "user.test").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_absent_is_an_error() {
        let temp = NamedTempFile::new().unwrap();
        let file = handle(&temp);
        let store = MemoryStore::new();

        assert!(store.remove(&file, "user.missing").is_err());
    }

    #[test]
    fn test_memory_store_keys_are_per_path() {
        let temp_a = NamedTempFile::new().unwrap();
        let temp_b = NamedTempFile::new().unwrap();
        let a = handle(&temp_a);
        let b = handle(&temp_b);
        let store = MemoryStore::new();

        store.set(&a, "user.one", b"1").unwrap();
        store.set(&b, "user.two", b"2").unwrap();

        assert_eq!(store.keys_for(temp_a.path()), vec!["user.one".to_string()]);
        assert_eq!(store.get(&b, "user.one").unwrap(), None);
    }
}
