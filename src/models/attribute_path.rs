//! Attribute path model
//!
//! An attribute path is an ordered list of [`Attribute`]s addressing a nested
//! field, e.g. `dc:creator` followed by `foaf:name`.

use std::borrow::Cow;
use std::sync::Arc;
use uuid::Uuid;

use super::attribute::Attribute;
use super::ordered::{CacheState, OrderedElements, PathElement};

/// Delimiter between canonical attribute path strings when paths themselves form a path
pub const ATTRIBUTE_PATH_DELIMITER: char = '\u{1F}';

/// Ordered sequence of attributes
///
/// Keeps the serialized id list (durable), the ordered attributes and the utilised
/// attribute set consistent under every mutation. Attributes are shared, never
/// owned; dropping a path leaves its attributes alive for other paths.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use data_mapping_sdk::models::{Attribute, AttributePath};
///
/// let creator = Arc::new(Attribute::new("http://purl.org/dc/terms/creator", Some("creator")));
/// let name = Arc::new(Attribute::new("http://xmlns.com/foaf/0.1/name", Some("name")));
///
/// let path = AttributePath::from_attributes(vec![creator, name]);
/// assert_eq!(
///     path.to_path_string(),
///     "http://purl.org/dc/terms/creator\u{1E}http://xmlns.com/foaf/0.1/name"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AttributePath {
    pub id: Uuid,
    attributes: OrderedElements<Arc<Attribute>>,
}

impl AttributePath {
    /// Create an empty attribute path with a fresh id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Create an empty attribute path with the given id
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            attributes: OrderedElements::new(id),
        }
    }

    /// Create an attribute path with a fresh id from an ordered list of attributes
    pub fn from_attributes(attributes: Vec<Arc<Attribute>>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            attributes: OrderedElements::from_elements(id, attributes),
        }
    }

    /// Rebuild an attribute path from storage
    ///
    /// `serialized` is the stored attribute id array and `utilised` the attributes
    /// associated with the path. The ordered view is decoded on first access.
    pub fn from_stored(id: Uuid, serialized: Option<String>, utilised: Vec<Arc<Attribute>>) -> Self {
        Self {
            id,
            attributes: OrderedElements::from_stored(id, serialized, utilised),
        }
    }

    /// The attribute path, i.e. the ordered list of attributes
    pub fn attributes(&self) -> &[Arc<Attribute>] {
        self.attributes.ordered()
    }

    /// The utilised attributes of this path
    ///
    /// An attribute may occur several times in the path but only once here.
    pub fn utilised_attributes(&self) -> &[Arc<Attribute>] {
        self.attributes.utilised()
    }

    pub fn attribute(&self, id: Uuid) -> Option<&Arc<Attribute>> {
        self.attributes.find(id)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Serialized attribute id array, the durable form of the order
    pub fn serialized(&self) -> Option<&str> {
        self.attributes.serialized()
    }

    /// Attribute id array encoded from the current order
    pub fn encoded_attributes(&self) -> Option<String> {
        self.attributes.encoded()
    }

    pub fn cache_state(&self) -> CacheState {
        self.attributes.state()
    }

    /// Decode the durable form if this path was loaded from storage and not read yet
    pub fn materialize(&self) {
        self.attributes.materialize();
    }

    /// Replace the attribute path; a no-op when the order is unchanged
    pub fn set_attributes(&mut self, attributes: Vec<Arc<Attribute>>) -> bool {
        self.attributes.set(attributes)
    }

    /// Append an attribute to the end of the path
    pub fn add_attribute(&mut self, attribute: Arc<Attribute>) {
        self.attributes.push(attribute);
    }

    /// Insert an attribute at `index` unless that position already holds it
    pub fn insert_attribute_at(&mut self, attribute: Arc<Attribute>, index: usize) -> bool {
        self.attributes.insert_at(attribute, index)
    }

    /// Remove the attribute at `index`
    pub fn remove_attribute_at(&mut self, index: usize) -> Option<Arc<Attribute>> {
        self.attributes.remove_at(index)
    }

    /// Canonical path string: attribute URIs joined by [`crate::models::ATTRIBUTE_DELIMITER`]
    ///
    /// This is the literal used to reference a record field in component
    /// parameter mappings.
    pub fn to_path_string(&self) -> String {
        self.attributes.to_path_string()
    }

    /// Whether both paths address the same field, regardless of their ids
    pub fn same_path(&self, other: &AttributePath) -> bool {
        self.to_path_string() == other.to_path_string()
    }
}

impl Default for AttributePath {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AttributePath {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.attributes == other.attributes
    }
}

impl PathElement for Arc<AttributePath> {
    const SEGMENT_DELIMITER: char = ATTRIBUTE_PATH_DELIMITER;

    fn storage_id(&self) -> Uuid {
        self.id
    }

    fn path_segment(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_path_string())
    }
}
