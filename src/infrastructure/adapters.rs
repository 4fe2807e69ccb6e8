use crate::application::storage::Storage;
use crate::domain::errors::StorageError;
use std::fs;
use std::path::PathBuf;

/// [Storage] backed by a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Storage for FsStorage {
    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.root.join(filename)).map_err(|e| StorageError::from_io(filename, e))
    }

    fn write(&self, filename: &str, contents: &[u8]) -> Result<(), StorageError> {
        fs::write(self.root.join(filename), contents)
            .map_err(|e| StorageError::from_io(filename, e))
    }
}
