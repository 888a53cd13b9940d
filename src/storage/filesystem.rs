//! File system storage backend
//!
//! Implements StorageBackend on the native file system, rooted at a workspace
//! directory. Paths containing `..` are rejected and resolved paths must stay
//! inside the root.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File system storage backend
pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

fn io_error(action: &str, path: &str, e: std::io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::PermissionDenied => StorageError::PermissionDenied(path.to_string()),
        _ => StorageError::IoError(format!("Failed to {} {}: {}", action, path, e)),
    }
}

impl FileSystemStorageBackend {
    /// Create a backend rooted at `base_path`
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_mapping_sdk::storage::filesystem::FileSystemStorageBackend;
    ///
    /// let backend = FileSystemStorageBackend::new("/workspace/mappings");
    /// assert!(backend.base_path().ends_with("mappings"));
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn ensure_contained(&self, existing: &Path) -> Result<PathBuf, StorageError> {
        let canonical = existing
            .canonicalize()
            .map_err(|e| StorageError::IoError(format!("Failed to resolve path: {}", e)))?;
        let base = self
            .base_path
            .canonicalize()
            .unwrap_or_else(|_| self.base_path.clone());

        if canonical.starts_with(&base) {
            Ok(canonical)
        } else {
            Err(StorageError::PermissionDenied(
                "Path escapes base directory".to_string(),
            ))
        }
    }

    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::PermissionDenied(
                "Path traversal (..) not allowed".to_string(),
            ));
        }

        let full = self.base_path.join(relative);
        if full.exists() {
            return self.ensure_contained(&full);
        }

        // Not created yet; the closest existing ancestor must be inside the root
        if let Some(ancestor) = full.ancestors().skip(1).find(|ancestor| ancestor.exists())
            && ancestor.starts_with(&self.base_path)
        {
            self.ensure_contained(ancestor)?;
        }

        Ok(full)
    }
}

#[async_trait(?Send)]
impl StorageBackend for FileSystemStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve_path(path)?;

        fs::read(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("read file", path, e),
        })
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", path, e))?;
        }

        debug!(path = %full_path.display(), bytes = content.len(), "writing file");
        fs::write(&full_path, content)
            .await
            .map_err(|e| io_error("write file", path, e))
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let full_path = self.resolve_path(dir)?;

        let mut read_dir = fs::read_dir(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::DirectoryNotFound(dir.to_string()),
            _ => io_error("read directory", dir, e),
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error("read directory entry in", dir, e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if let (true, Some(name)) = (is_file, entry.file_name().to_str()) {
                entries.push(name.to_string());
            }
        }

        entries.sort();
        Ok(entries)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;

        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("check file", path, e)),
        }
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        fs::remove_file(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("delete file", path, e),
        })
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| io_error("create directory", path, e))
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;

        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("check directory", path, e)),
        }
    }
}
