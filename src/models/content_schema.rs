//! Content schema model
//!
//! A content schema is an overlay on a schema that identifies the natural key
//! attribute paths of a record and the attribute path holding its primary value.

use std::sync::Arc;
use uuid::Uuid;

use super::attribute_path::AttributePath;
use super::ordered::{CacheState, OrderedElements};

/// Ordered key attribute paths plus one value attribute path
///
/// Key attribute paths follow the same durable/ordered/utilised caching scheme as
/// the attributes of an [`AttributePath`].
#[derive(Debug, Clone)]
pub struct ContentSchema {
    pub id: Uuid,
    pub name: Option<String>,
    pub record_identifier_attribute_path: Option<Arc<AttributePath>>,
    key_attribute_paths: OrderedElements<Arc<AttributePath>>,
    pub value_attribute_path: Option<Arc<AttributePath>>,
}

impl ContentSchema {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            record_identifier_attribute_path: None,
            key_attribute_paths: OrderedElements::new(id),
            value_attribute_path: None,
        }
    }

    /// Create a content schema from its key attribute paths and value attribute path
    pub fn from_parts(
        record_identifier_attribute_path: Option<Arc<AttributePath>>,
        key_attribute_paths: Vec<Arc<AttributePath>>,
        value_attribute_path: Option<Arc<AttributePath>>,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            name: None,
            record_identifier_attribute_path,
            key_attribute_paths: OrderedElements::from_elements(id, key_attribute_paths),
            value_attribute_path,
        }
    }

    /// Rebuild a content schema from storage; key paths are decoded on first access
    pub fn from_stored(
        id: Uuid,
        serialized_key_attribute_paths: Option<String>,
        utilised_key_attribute_paths: Vec<Arc<AttributePath>>,
    ) -> Self {
        Self {
            id,
            name: None,
            record_identifier_attribute_path: None,
            key_attribute_paths: OrderedElements::from_stored(
                id,
                serialized_key_attribute_paths,
                utilised_key_attribute_paths,
            ),
            value_attribute_path: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn key_attribute_paths(&self) -> &[Arc<AttributePath>] {
        self.key_attribute_paths.ordered()
    }

    pub fn utilised_key_attribute_paths(&self) -> &[Arc<AttributePath>] {
        self.key_attribute_paths.utilised()
    }

    pub fn key_attribute_path(&self, id: Uuid) -> Option<&Arc<AttributePath>> {
        self.key_attribute_paths.find(id)
    }

    pub fn serialized_key_attribute_paths(&self) -> Option<&str> {
        self.key_attribute_paths.serialized()
    }

    pub fn encoded_key_attribute_paths(&self) -> Option<String> {
        self.key_attribute_paths.encoded()
    }

    pub fn key_attribute_paths_state(&self) -> CacheState {
        self.key_attribute_paths.state()
    }

    /// Replace the key attribute paths; a no-op when the order is unchanged
    pub fn set_key_attribute_paths(&mut self, key_attribute_paths: Vec<Arc<AttributePath>>) -> bool {
        self.key_attribute_paths.set(key_attribute_paths)
    }

    pub fn add_key_attribute_path(&mut self, key_attribute_path: Arc<AttributePath>) {
        self.key_attribute_paths.push(key_attribute_path);
    }

    pub fn insert_key_attribute_path_at(
        &mut self,
        key_attribute_path: Arc<AttributePath>,
        index: usize,
    ) -> bool {
        self.key_attribute_paths.insert_at(key_attribute_path, index)
    }

    pub fn remove_key_attribute_path_at(&mut self, index: usize) -> Option<Arc<AttributePath>> {
        self.key_attribute_paths.remove_at(index)
    }

    pub fn set_record_identifier_attribute_path(&mut self, path: Option<Arc<AttributePath>>) {
        self.record_identifier_attribute_path = path;
    }

    pub fn set_value_attribute_path(&mut self, path: Option<Arc<AttributePath>>) {
        self.value_attribute_path = path;
    }
}

impl Default for ContentSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ContentSchema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.record_identifier_attribute_path == other.record_identifier_attribute_path
            && self.key_attribute_paths == other.key_attribute_paths
            && self.value_attribute_path == other.value_attribute_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;

    fn path(uri: &str) -> Arc<AttributePath> {
        Arc::new(AttributePath::from_attributes(vec![Arc::new(Attribute::new(uri, None))]))
    }

    #[test]
    fn test_key_paths_keep_order_and_set() {
        let isbn = path("http://purl.org/ontology/bibo/isbn");
        let title = path("http://purl.org/dc/terms/title");
        let value = path("http://www.w3.org/1999/02/22-rdf-syntax-ns#value");

        let mut schema = ContentSchema::from_parts(None, vec![isbn.clone(), title.clone()], Some(value));
        schema.add_key_attribute_path(isbn.clone());

        assert_eq!(schema.key_attribute_paths().len(), 3);
        assert_eq!(schema.utilised_key_attribute_paths().len(), 2);

        assert_eq!(schema.remove_key_attribute_path_at(0), Some(isbn.clone()));
        assert_eq!(schema.key_attribute_paths(), &[title.clone(), isbn.clone()]);
        assert!(schema.key_attribute_path(isbn.id).is_some());
    }

    #[test]
    fn test_reload_key_paths() {
        let a = path("http://example.org/a");
        let b = path("http://example.org/b");
        let schema = ContentSchema::from_parts(None, vec![b.clone(), a.clone()], None);

        let reloaded = ContentSchema::from_stored(
            schema.id,
            schema.serialized_key_attribute_paths().map(str::to_string),
            vec![a.clone(), b.clone()],
        );
        assert_eq!(reloaded.key_attribute_paths_state(), CacheState::Unloaded);
        assert_eq!(reloaded.key_attribute_paths(), &[b, a]);
    }

    #[test]
    fn test_insert_same_key_path_is_a_no_op() {
        let a = path("http://example.org/a");
        let mut schema = ContentSchema::from_parts(None, vec![a.clone()], None);
        let bytes = schema.serialized_key_attribute_paths().map(str::to_string);

        assert!(!schema.insert_key_attribute_path_at(a, 0));
        assert_eq!(schema.serialized_key_attribute_paths().map(str::to_string), bytes);
    }
}
