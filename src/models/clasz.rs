//! Record class model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record-type tag attached to a schema, e.g. `http://purl.org/ontology/bibo/Document`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Clasz {
    pub id: Uuid,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Clasz {
    /// Create a class whose id is derived from its URI
    pub fn new(uri: impl Into<String>, name: Option<&str>) -> Self {
        let uri = uri.into();
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, uri.as_bytes()),
            uri,
            name: name.map(str::to_string),
        }
    }
}
