//! Storage backend abstraction
//!
//! Defines the StorageBackend trait the persistence collaborator writes mapping
//! and schema documents through:
//! - MemoryStorageBackend: in-process map (always available)
//! - FileSystemStorageBackend: native file system (feature `native-fs`)

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Error type for storage and persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
    /// A persisted document refers to a record it does not contain
    #[error("Document {document} references unknown {kind} {id}")]
    DanglingReference {
        document: String,
        kind: &'static str,
        id: Uuid,
    },
}

/// Trait for storage backends
///
/// Paths are `/`-separated and relative to the backend's root.
#[async_trait(?Send)]
pub trait StorageBackend: Send + Sync {
    /// Read a file from storage
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a file to storage, creating missing parent directories
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// List the file names directly inside a directory
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError>;

    /// Check if a file exists
    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete a file
    async fn delete_file(&self, path: &str) -> Result<(), StorageError>;

    /// Create a directory
    async fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    /// Check if a directory exists
    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError>;
}

/// Lets a saver and a loader share one backend
#[async_trait(?Send)]
impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        (**self).read_file(path).await
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        (**self).write_file(path, content).await
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        (**self).list_files(dir).await
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        (**self).file_exists(path).await
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        (**self).delete_file(path).await
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        (**self).create_dir(path).await
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        (**self).dir_exists(path).await
    }
}

pub mod memory;

#[cfg(feature = "native-fs")]
pub mod filesystem;

pub use memory::MemoryStorageBackend;
