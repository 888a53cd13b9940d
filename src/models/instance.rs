//! Attribute path instances
//!
//! An attribute path instance is one use-site of a shared [`AttributePath`]:
//! either inside a mapping (with an optional filter and ordinal) or inside a
//! schema (with cardinality flags and an optional sub schema).

use std::sync::Arc;
use uuid::Uuid;

use super::attribute_path::AttributePath;
use super::error::{ModelError, ModelResult};
use super::filter::Filter;
use super::schema::Schema;

/// Use-site of an attribute path inside a mapping
#[derive(Debug, Clone, PartialEq)]
pub struct MappingAttributePathInstance {
    pub id: Uuid,
    pub name: Option<String>,
    pub attribute_path: Arc<AttributePath>,
    pub filter: Option<Arc<Filter>>,
    ordinal: Option<i64>,
}

impl MappingAttributePathInstance {
    pub fn new(attribute_path: Arc<AttributePath>) -> Self {
        Self::with_id(Uuid::new_v4(), attribute_path)
    }

    pub fn with_id(id: Uuid, attribute_path: Arc<AttributePath>) -> Self {
        Self {
            id,
            name: None,
            attribute_path,
            filter: None,
            ordinal: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_filter(mut self, filter: Arc<Filter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Position of the value to pick when the path yields several values
    pub fn ordinal(&self) -> Option<i64> {
        self.ordinal
    }

    /// Set or clear the ordinal
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NegativeOrdinal`] for values below zero; the current
    /// ordinal is left unchanged in that case.
    pub fn set_ordinal(&mut self, ordinal: Option<i64>) -> ModelResult<()> {
        if let Some(value) = ordinal.filter(|value| *value < 0) {
            return Err(ModelError::NegativeOrdinal(value));
        }

        self.ordinal = ordinal;
        Ok(())
    }

    pub fn set_filter(&mut self, filter: Option<Arc<Filter>>) {
        self.filter = filter;
    }
}

/// Use-site of an attribute path inside a schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAttributePathInstance {
    pub id: Uuid,
    pub name: Option<String>,
    pub attribute_path: Arc<AttributePath>,
    /// Schema describing the value addressed by this path, if it is structured
    pub sub_schema: Option<Arc<Schema>>,
    pub required: bool,
    pub multivalue: bool,
}

impl SchemaAttributePathInstance {
    pub fn new(attribute_path: Arc<AttributePath>) -> Self {
        Self::with_id(Uuid::new_v4(), attribute_path)
    }

    pub fn with_id(id: Uuid, attribute_path: Arc<AttributePath>) -> Self {
        Self {
            id,
            name: None,
            attribute_path,
            sub_schema: None,
            required: false,
            multivalue: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sub_schema(mut self, sub_schema: Arc<Schema>) -> Self {
        self.sub_schema = Some(sub_schema);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_multivalue(mut self, multivalue: bool) -> Self {
        self.multivalue = multivalue;
        self
    }
}

/// Either kind of attribute path instance
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathInstance {
    Mapping(MappingAttributePathInstance),
    Schema(SchemaAttributePathInstance),
}

impl AttributePathInstance {
    pub fn id(&self) -> Uuid {
        match self {
            AttributePathInstance::Mapping(instance) => instance.id,
            AttributePathInstance::Schema(instance) => instance.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            AttributePathInstance::Mapping(instance) => instance.name.as_deref(),
            AttributePathInstance::Schema(instance) => instance.name.as_deref(),
        }
    }

    pub fn attribute_path(&self) -> &Arc<AttributePath> {
        match self {
            AttributePathInstance::Mapping(instance) => &instance.attribute_path,
            AttributePathInstance::Schema(instance) => &instance.attribute_path,
        }
    }
}

impl From<MappingAttributePathInstance> for AttributePathInstance {
    fn from(instance: MappingAttributePathInstance) -> Self {
        AttributePathInstance::Mapping(instance)
    }
}

impl From<SchemaAttributePathInstance> for AttributePathInstance {
    fn from(instance: SchemaAttributePathInstance) -> Self {
        AttributePathInstance::Schema(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;

    fn creator_path() -> Arc<AttributePath> {
        Arc::new(AttributePath::from_attributes(vec![Arc::new(Attribute::new(
            "http://purl.org/dc/terms/creator",
            None,
        ))]))
    }

    #[test]
    fn test_ordinal_rejects_negative_values() {
        let mut instance = MappingAttributePathInstance::new(creator_path());

        let err = instance.set_ordinal(Some(-1)).unwrap_err();
        assert_eq!(err, ModelError::NegativeOrdinal(-1));
        assert_eq!(instance.ordinal(), None);

        instance.set_ordinal(Some(0)).unwrap();
        assert_eq!(instance.ordinal(), Some(0));

        assert!(instance.set_ordinal(Some(-5)).is_err());
        assert_eq!(instance.ordinal(), Some(0));

        instance.set_ordinal(None).unwrap();
        assert_eq!(instance.ordinal(), None);
    }

    #[test]
    fn test_union_accessors() {
        let path = creator_path();
        let mapping: AttributePathInstance = MappingAttributePathInstance::new(path.clone())
            .with_name("input")
            .into();
        let schema: AttributePathInstance = SchemaAttributePathInstance::new(path.clone())
            .with_required(true)
            .into();

        assert_eq!(mapping.name(), Some("input"));
        assert_eq!(schema.name(), None);
        assert!(Arc::ptr_eq(mapping.attribute_path(), schema.attribute_path()));
        assert_ne!(mapping.id(), schema.id());
        assert!(matches!(schema, AttributePathInstance::Schema(ref s) if s.required));
    }
}
