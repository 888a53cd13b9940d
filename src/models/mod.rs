//! Models module for the SDK
//!
//! Passive entity model of attribute paths, schemas and transformation graphs.
//! Entities never validate graph wiring; that is left to the execution engine.

pub mod attribute;
pub mod attribute_path;
pub mod binding;
pub mod clasz;
pub mod component;
pub mod content_schema;
pub mod error;
pub mod filter;
pub mod function;
pub mod instance;
pub mod mapping;
pub mod ordered;
pub mod schema;

pub use attribute::{ATTRIBUTE_DELIMITER, Attribute};
pub use attribute_path::{ATTRIBUTE_PATH_DELIMITER, AttributePath};
pub use clasz::Clasz;
pub use component::Component;
pub use content_schema::ContentSchema;
pub use error::{ModelError, ModelResult};
pub use filter::Filter;
pub use function::{ComponentGraph, Function, FunctionKind};
pub use instance::{AttributePathInstance, MappingAttributePathInstance, SchemaAttributePathInstance};
pub use mapping::Mapping;
pub use ordered::{CacheState, OrderedElements, PathElement};
pub use schema::Schema;
