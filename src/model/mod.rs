//! Model loading and saving functionality
//!
//! Persists mappings and schemas through storage backends and rebuilds their
//! entity graphs.

pub mod loader;
pub mod records;
pub mod saver;

pub use loader::{LoadFailure, LoadResult, ModelLoader};
pub use records::{MappingDocument, SchemaDocument};
pub use saver::ModelSaver;
