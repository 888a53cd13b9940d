//! Persisted document records
//!
//! Mapping and schema documents are normalized: every entity is written once as
//! a flat record and refers to other entities by id. Attribute paths keep the
//! unordered association (`attributes`) next to the serialized order
//! (`orderedAttributes`), mirroring what a relational store would hold.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::DocumentFormat;
use crate::models::{Attribute, Clasz, Filter};
use crate::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributePathRecord {
    pub id: Uuid,
    /// Utilised attributes, order irrelevant
    #[serde(default)]
    pub attributes: Vec<Uuid>,
    /// JSON array of attribute ids in path order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered_attributes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FunctionKindRecord {
    #[serde(rename_all = "camelCase")]
    Function {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function_description: Option<serde_json::Value>,
    },
    Transformation {
        #[serde(default)]
        components: Vec<Uuid>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    pub kind: FunctionKindRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<Uuid>,
    #[serde(default)]
    pub parameter_mappings: BTreeMap<String, String>,
    #[serde(default)]
    pub input_components: Vec<Uuid>,
    #[serde(default)]
    pub output_components: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AttributePathInstanceRecord {
    #[serde(rename_all = "camelCase")]
    Mapping {
        id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        attribute_path: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ordinal: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Schema {
        id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        attribute_path: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sub_schema: Option<Uuid>,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        multivalue: bool,
    },
}

impl AttributePathInstanceRecord {
    pub fn id(&self) -> Uuid {
        match self {
            AttributePathInstanceRecord::Mapping { id, .. } => *id,
            AttributePathInstanceRecord::Schema { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSchemaRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_identifier_attribute_path: Option<Uuid>,
    /// Utilised key attribute paths, order irrelevant
    #[serde(default)]
    pub key_attribute_paths: Vec<Uuid>,
    /// JSON array of key attribute path ids in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered_key_attribute_paths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_attribute_path: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    /// Schema attribute path instance ids
    #[serde(default)]
    pub attribute_paths: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_class: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_schema: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Mapping attribute path instance ids
    #[serde(default)]
    pub input_attribute_paths: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_attribute_path: Option<Uuid>,
    /// Root component id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Uuid>,
}

/// One persisted mapping with everything it references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    pub mapping: MappingRecord,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub attribute_paths: Vec<AttributePathRecord>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub attribute_path_instances: Vec<AttributePathInstanceRecord>,
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// One persisted schema with its sub schemas and everything they reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub schema: SchemaRecord,
    /// Sub schemas referenced by attribute path instances
    #[serde(default)]
    pub schemas: Vec<SchemaRecord>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub attribute_paths: Vec<AttributePathRecord>,
    #[serde(default)]
    pub attribute_path_instances: Vec<AttributePathInstanceRecord>,
    #[serde(default)]
    pub content_schemas: Vec<ContentSchemaRecord>,
    #[serde(default)]
    pub claszes: Vec<Clasz>,
}

pub(crate) fn encode<T: Serialize>(document: &T, format: DocumentFormat) -> Result<Vec<u8>, StorageError> {
    match format {
        DocumentFormat::Yaml => serde_yaml::to_string(document)
            .map(String::into_bytes)
            .map_err(|e| StorageError::SerializationError(format!("Failed to write YAML: {}", e))),
        DocumentFormat::Json => serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::SerializationError(format!("Failed to write JSON: {}", e))),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(content: &[u8], format: DocumentFormat) -> Result<T, StorageError> {
    match format {
        DocumentFormat::Yaml => serde_yaml::from_slice(content)
            .map_err(|e| StorageError::SerializationError(format!("Failed to parse YAML: {}", e))),
        DocumentFormat::Json => serde_json::from_slice(content)
            .map_err(|e| StorageError::SerializationError(format!("Failed to parse JSON: {}", e))),
    }
}
