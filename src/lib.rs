//! Data Mapping SDK - attribute path and transformation graph model
//!
//! Provides:
//! - Ordered attribute paths over an unordered storage association
//! - Schemas, content schemas and record classes
//! - Functions, transformations and their component graphs
//! - Mappings binding input and output attribute paths to a transformation
//! - Model loading/saving through storage backends

pub mod config;
pub mod model;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigError, DocumentFormat, WorkspaceConfig};
pub use storage::{MemoryStorageBackend, StorageBackend, StorageError};
#[cfg(feature = "native-fs")]
pub use storage::filesystem::FileSystemStorageBackend;

pub use model::{LoadFailure, LoadResult, ModelLoader, ModelSaver};

// Re-export models
pub use models::{
    Attribute, AttributePath, AttributePathInstance, CacheState, Clasz, Component, ComponentGraph,
    ContentSchema, Filter, Function, FunctionKind, Mapping, MappingAttributePathInstance,
    ModelError, ModelResult, Schema, SchemaAttributePathInstance,
};
