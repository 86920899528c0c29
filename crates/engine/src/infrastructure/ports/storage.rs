//! Key-value persistence port.

use super::error::StorageError;

/// Synchronous string key-value store.
///
/// `load` returns `Ok(None)` for a key that was never written.
#[cfg_attr(test, mockall::automock)]
pub trait StoragePort: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
