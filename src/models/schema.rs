//! Schema model
//!
//! A schema is the unordered collection of attribute paths a record type can have,
//! tagged with its record class.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::attribute_path::AttributePath;
use super::clasz::Clasz;
use super::content_schema::ContentSchema;
use super::instance::SchemaAttributePathInstance;

/// Record schema
///
/// Attribute paths are unique by their canonical path string; order is
/// irrelevant and equality is membership-based.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use data_mapping_sdk::models::{Attribute, AttributePath, Schema, SchemaAttributePathInstance};
///
/// let title = Arc::new(Attribute::new("http://purl.org/dc/terms/title", Some("title")));
/// let path = Arc::new(AttributePath::from_attributes(vec![title]));
///
/// let mut schema = Schema::new().with_name("bibo");
/// assert!(schema.add_attribute_path(SchemaAttributePathInstance::new(path.clone())));
/// assert!(!schema.add_attribute_path(SchemaAttributePathInstance::new(path)));
/// assert_eq!(schema.attribute_paths().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    pub id: Uuid,
    pub name: Option<String>,
    pub base_uri: Option<String>,
    attribute_paths: Vec<SchemaAttributePathInstance>,
    /// Canonical path string to position, built on first lookup
    path_index: OnceCell<HashMap<String, usize>>,
    pub record_class: Option<Clasz>,
    pub content_schema: Option<ContentSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            base_uri: None,
            attribute_paths: Vec::new(),
            path_index: OnceCell::new(),
            record_class: None,
            content_schema: None,
        }
    }

    /// Rebuild a schema from stored instances
    ///
    /// Instances are kept as stored and their paths are not read, so a loaded
    /// path stays unloaded until the schema is searched by path string or grown.
    pub fn from_stored(id: Uuid, attribute_paths: Vec<SchemaAttributePathInstance>) -> Self {
        Self {
            attribute_paths,
            ..Self::with_id(id)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn with_record_class(mut self, record_class: Clasz) -> Self {
        self.record_class = Some(record_class);
        self
    }

    pub fn with_content_schema(mut self, content_schema: ContentSchema) -> Self {
        self.content_schema = Some(content_schema);
        self
    }

    pub fn attribute_paths(&self) -> &[SchemaAttributePathInstance] {
        &self.attribute_paths
    }

    /// Add an attribute path instance
    ///
    /// Returns `false` without changing the schema if an instance for the same
    /// canonical path string is already present.
    pub fn add_attribute_path(&mut self, instance: SchemaAttributePathInstance) -> bool {
        let path_string = instance.attribute_path.to_path_string();
        if self.path_index().contains_key(&path_string) {
            debug!(schema = %self.id, path = %path_string, "attribute path already part of schema");
            return false;
        }

        let position = self.attribute_paths.len();
        self.attribute_paths.push(instance);
        if let Some(index) = self.path_index.get_mut() {
            index.insert(path_string, position);
        }
        true
    }

    /// Replace all attribute path instances, dropping duplicate paths
    pub fn set_attribute_paths(&mut self, instances: Vec<SchemaAttributePathInstance>) {
        self.attribute_paths.clear();
        self.path_index = OnceCell::new();
        for instance in instances {
            self.add_attribute_path(instance);
        }
    }

    pub fn remove_attribute_path(&mut self, id: Uuid) -> Option<SchemaAttributePathInstance> {
        let position = self.attribute_paths.iter().position(|instance| instance.id == id)?;
        self.path_index = OnceCell::new();
        Some(self.attribute_paths.remove(position))
    }

    pub fn attribute_path_instance(&self, id: Uuid) -> Option<&SchemaAttributePathInstance> {
        self.attribute_paths.iter().find(|instance| instance.id == id)
    }

    /// Look up the instance whose attribute path renders as `path_string`
    pub fn attribute_path_by_string(&self, path_string: &str) -> Option<&SchemaAttributePathInstance> {
        self.path_index()
            .get(path_string)
            .and_then(|&position| self.attribute_paths.get(position))
    }

    fn path_index(&self) -> &HashMap<String, usize> {
        self.path_index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.attribute_paths.len());
            for (position, instance) in self.attribute_paths.iter().enumerate() {
                index
                    .entry(instance.attribute_path.to_path_string())
                    .or_insert(position);
            }
            index
        })
    }

    /// The bare attribute paths of this schema
    pub fn paths(&self) -> impl Iterator<Item = &Arc<AttributePath>> {
        self.attribute_paths.iter().map(|instance| &instance.attribute_path)
    }

    pub fn set_record_class(&mut self, record_class: Option<Clasz>) {
        self.record_class = record_class;
    }

    pub fn set_content_schema(&mut self, content_schema: Option<ContentSchema>) {
        self.content_schema = content_schema;
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.base_uri == other.base_uri
            && self.record_class == other.record_class
            && self.content_schema == other.content_schema
            && self.attribute_paths.len() == other.attribute_paths.len()
            && self
                .attribute_paths
                .iter()
                .all(|instance| other.attribute_paths.contains(instance))
    }
}
