//! In-memory storage backend
//!
//! Implements StorageBackend over a process-local map. Used by tests and by
//! callers that persist entity graphs only for the lifetime of the process.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Entries {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl Entries {
    fn add_parents(&mut self, path: &str) {
        let mut current = path;
        while let Some((parent, _)) = current.rsplit_once('/') {
            self.dirs.insert(parent.to_string());
            current = parent;
        }
    }

    fn has_dir(&self, dir: &str) -> bool {
        if dir.is_empty() || self.dirs.contains(dir) {
            return true;
        }

        let prefix = format!("{}/", dir);
        self.files.keys().any(|path| path.starts_with(&prefix))
    }
}

/// In-memory storage backend
///
/// # Example
///
/// ```rust
/// use data_mapping_sdk::storage::{MemoryStorageBackend, StorageBackend};
///
/// let backend = MemoryStorageBackend::new();
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// runtime.block_on(async {
///     backend.write_file("mappings/a.yaml", b"id: a").await.unwrap();
///     assert_eq!(backend.list_files("mappings").await.unwrap(), vec!["a.yaml"]);
/// });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    entries: Mutex<Entries>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(path: &str) -> Result<String, StorageError> {
        let normalized = path.trim_matches('/');
        if normalized.split('/').any(|segment| segment == "..") {
            return Err(StorageError::PermissionDenied(
                "Path traversal (..) not allowed".to_string(),
            ));
        }
        Ok(normalized.to_string())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::BackendError(format!("Memory storage lock poisoned: {}", e)))
    }
}

#[async_trait(?Send)]
impl StorageBackend for MemoryStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = Self::normalize(path)?;
        self.lock()?
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let key = Self::normalize(path)?;
        let mut entries = self.lock()?;
        entries.add_parents(&key);
        entries.files.insert(key, content.to_vec());
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir_key = Self::normalize(dir)?;
        let entries = self.lock()?;
        if !entries.has_dir(&dir_key) {
            return Err(StorageError::DirectoryNotFound(dir.to_string()));
        }

        let prefix = if dir_key.is_empty() {
            String::new()
        } else {
            format!("{}/", dir_key)
        };

        Ok(entries
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect())
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = Self::normalize(path)?;
        Ok(self.lock()?.files.contains_key(&key))
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let key = Self::normalize(path)?;
        self.lock()?
            .files
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let key = Self::normalize(path)?;
        let mut entries = self.lock()?;
        entries.add_parents(&key);
        entries.dirs.insert(key);
        Ok(())
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = Self::normalize(path)?;
        Ok(self.lock()?.has_dir(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_write_read_and_list() {
        let backend = MemoryStorageBackend::new();
        block_on(async {
            backend.write_file("/workspace/mappings/a.yaml", b"a").await.unwrap();
            backend.write_file("workspace/mappings/b.yaml", b"b").await.unwrap();
            backend.write_file("workspace/mappings/nested/c.yaml", b"c").await.unwrap();

            assert_eq!(backend.read_file("workspace/mappings/a.yaml").await.unwrap(), b"a");
            assert_eq!(
                backend.list_files("workspace/mappings").await.unwrap(),
                vec!["a.yaml".to_string(), "b.yaml".to_string()]
            );
            assert!(backend.dir_exists("workspace").await.unwrap());
            assert!(backend.dir_exists("workspace/mappings/nested").await.unwrap());
        });
    }

    #[test]
    fn test_missing_entries() {
        let backend = MemoryStorageBackend::new();
        block_on(async {
            assert!(matches!(
                backend.read_file("missing.yaml").await,
                Err(StorageError::FileNotFound(_))
            ));
            assert!(matches!(
                backend.list_files("nowhere").await,
                Err(StorageError::DirectoryNotFound(_))
            ));
            assert!(matches!(
                backend.delete_file("missing.yaml").await,
                Err(StorageError::FileNotFound(_))
            ));

            backend.create_dir("empty").await.unwrap();
            assert!(backend.list_files("empty").await.unwrap().is_empty());
            assert!(!backend.file_exists("empty").await.unwrap());
        });
    }

    #[test]
    fn test_path_traversal_blocked() {
        let backend = MemoryStorageBackend::new();
        block_on(async {
            let result = backend.write_file("../etc/passwd", b"x").await;
            assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
        });
    }
}
