use crate::domain::errors::StorageError;
use std::fmt::Debug;

/// Byte storage addressed by a bare filename.
///
/// Filenames come straight from the request path and are not sanitized.
/// Concurrent writes to the same name are not serialized here.
pub trait Storage: Debug + Send + Sync {
    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError>;

    fn write(&self, filename: &str, contents: &[u8]) -> Result<(), StorageError>;
}
