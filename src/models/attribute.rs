//! Attribute model
//!
//! An attribute is a property: in a graph it is the relation between a subject and
//! an object (e.g. `http://purl.org/dc/terms/title`), in a CSV document it is the
//! header of one column.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;
use uuid::Uuid;

use super::ordered::PathElement;

/// Delimiter between attribute URIs in a canonical attribute path string
///
/// The ASCII record separator never occurs inside a URI.
pub const ATTRIBUTE_DELIMITER: char = '\u{1E}';

/// Addressable leaf field, identified by its URI
///
/// Attributes are shared by every attribute path that uses them and are never
/// owned by a single path.
///
/// # Example
///
/// ```rust
/// use data_mapping_sdk::models::Attribute;
///
/// let title = Attribute::new("http://purl.org/dc/terms/title", Some("title"));
/// assert_eq!(title.id, Attribute::generate_id("http://purl.org/dc/terms/title"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub id: Uuid,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attribute {
    /// Create an attribute whose id is derived from its URI
    pub fn new(uri: impl Into<String>, name: Option<&str>) -> Self {
        let uri = uri.into();
        Self {
            id: Self::generate_id(&uri),
            uri,
            name: name.map(str::to_string),
        }
    }

    /// Create an attribute with an id handed out by an attribute registry
    pub fn with_id(id: Uuid, uri: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id,
            uri: uri.into(),
            name: name.map(str::to_string),
        }
    }

    /// Generate a deterministic UUID v5 from the attribute URI
    pub fn generate_id(uri: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, uri.as_bytes())
    }
}

impl PathElement for Arc<Attribute> {
    const SEGMENT_DELIMITER: char = ATTRIBUTE_DELIMITER;

    fn storage_id(&self) -> Uuid {
        self.id
    }

    fn path_segment(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_deterministic_per_uri() {
        let a = Attribute::new("http://xmlns.com/foaf/0.1/name", Some("name"));
        let b = Attribute::new("http://xmlns.com/foaf/0.1/name", None);
        assert_eq!(a.id, b.id);
        assert_ne!(a, b);

        let c = Attribute::new("http://xmlns.com/foaf/0.1/familyName", None);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_serde_skips_missing_name() {
        let attr = Attribute::new("http://purl.org/dc/terms/creator", None);
        let json = serde_json::to_string(&attr).unwrap();
        assert!(!json.contains("name"));

        let back: Attribute = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attr);
    }
}
