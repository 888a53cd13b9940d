//! Model saving functionality
//!
//! Saves mappings and schemas to storage backends as normalized documents,
//! one file per root entity.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::records::{
    self, AttributePathInstanceRecord, AttributePathRecord, ComponentRecord, ContentSchemaRecord,
    FunctionKindRecord, FunctionRecord, MappingDocument, MappingRecord, SchemaDocument, SchemaRecord,
};
use crate::config::WorkspaceConfig;
use crate::models::{
    Attribute, AttributePath, Clasz, Component, ContentSchema, Filter, Function, FunctionKind,
    Mapping, MappingAttributePathInstance, Schema, SchemaAttributePathInstance,
};
use crate::storage::{StorageBackend, StorageError};

/// Model saver that uses a storage backend
pub struct ModelSaver<B: StorageBackend> {
    storage: B,
    config: WorkspaceConfig,
}

impl<B: StorageBackend> ModelSaver<B> {
    /// Create a new model saver with the default workspace layout
    pub fn new(storage: B) -> Self {
        Self::with_config(storage, WorkspaceConfig::default())
    }

    pub fn with_config(storage: B, config: WorkspaceConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Save a mapping with its attribute paths and transformation graph
    ///
    /// Writes `{workspace}/{mappings_dir}/{id}.{yaml|json}` and returns that path.
    pub async fn save_mapping(&self, workspace_path: &str, mapping: &Mapping) -> Result<String, StorageError> {
        let mut builder = DocumentBuilder::default();
        let record = builder.mapping(mapping);
        let document = builder.into_mapping_document(record);

        let file_path = self
            .write_document(workspace_path, &self.config.mappings_dir, mapping.id, &document)
            .await?;

        info!(
            "Saved mapping {} ({} components, {} functions) to {}",
            mapping.id,
            document.components.len(),
            document.functions.len(),
            file_path
        );
        Ok(file_path)
    }

    /// Save a schema with its sub schemas, attribute paths and content schema
    ///
    /// Writes `{workspace}/{schemas_dir}/{id}.{yaml|json}` and returns that path.
    pub async fn save_schema(&self, workspace_path: &str, schema: &Schema) -> Result<String, StorageError> {
        let mut builder = DocumentBuilder::default();
        let record = builder.schema(schema);
        let document = builder.into_schema_document(schema.id, record);

        let file_path = self
            .write_document(workspace_path, &self.config.schemas_dir, schema.id, &document)
            .await?;

        info!(
            "Saved schema {} ({} attribute paths) to {}",
            schema.id,
            document.attribute_paths.len(),
            file_path
        );
        Ok(file_path)
    }

    async fn write_document<T: serde::Serialize>(
        &self,
        workspace_path: &str,
        dir: &str,
        id: Uuid,
        document: &T,
    ) -> Result<String, StorageError> {
        let dir_path = format!("{}/{}", workspace_path.trim_end_matches('/'), dir.trim_matches('/'));
        if !self.storage.dir_exists(&dir_path).await? {
            self.storage.create_dir(&dir_path).await?;
        }

        let file_path = format!("{}/{}.{}", dir_path, id, self.config.format.extension());
        let content = records::encode(document, self.config.format)?;
        self.storage.write_file(&file_path, &content).await?;
        Ok(file_path)
    }
}

/// Rows of one kind, written once per id in first-seen order
struct Rows<T> {
    ids: HashSet<Uuid>,
    rows: Vec<T>,
}

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Self {
            ids: HashSet::new(),
            rows: Vec::new(),
        }
    }
}

impl<T> Rows<T> {
    /// Reserve `id`; returns `false` if it was written already
    fn claim(&mut self, id: Uuid) -> bool {
        self.ids.insert(id)
    }

    fn push(&mut self, row: T) {
        self.rows.push(row);
    }
}

#[derive(Default)]
struct DocumentBuilder {
    attributes: Rows<Attribute>,
    attribute_paths: Rows<AttributePathRecord>,
    filters: Rows<Filter>,
    instances: Rows<AttributePathInstanceRecord>,
    functions: Rows<FunctionRecord>,
    components: Rows<ComponentRecord>,
    content_schemas: Rows<ContentSchemaRecord>,
    claszes: Rows<Clasz>,
    schemas: Rows<SchemaRecord>,
}

impl DocumentBuilder {
    fn attribute_path(&mut self, path: &Arc<AttributePath>) -> Uuid {
        if !self.attribute_paths.claim(path.id) {
            return path.id;
        }

        let utilised = path.utilised_attributes();
        for attribute in utilised {
            if self.attributes.claim(attribute.id) {
                self.attributes.push(Attribute::clone(attribute));
            }
        }

        self.attribute_paths.push(AttributePathRecord {
            id: path.id,
            attributes: utilised.iter().map(|attribute| attribute.id).collect(),
            ordered_attributes: path.encoded_attributes(),
        });
        path.id
    }

    fn function(&mut self, function: &Function) -> Uuid {
        if !self.functions.claim(function.id) {
            return function.id;
        }

        let kind = match &function.kind {
            FunctionKind::Atomic {
                function_description,
            } => FunctionKindRecord::Function {
                function_description: function_description.clone(),
            },
            FunctionKind::Transformation(graph) => FunctionKindRecord::Transformation {
                components: graph
                    .components()
                    .iter()
                    .map(|component| self.component(component))
                    .collect(),
            },
        };

        self.functions.push(FunctionRecord {
            id: function.id,
            name: function.name.clone(),
            description: function.description.clone(),
            parameters: function.parameters().to_vec(),
            kind,
        });
        function.id
    }

    fn component(&mut self, component: &Component) -> Uuid {
        if !self.components.claim(component.id) {
            return component.id;
        }

        let function = component.function().map(|function| self.function(function));
        self.components.push(ComponentRecord {
            id: component.id,
            name: component.name.clone(),
            description: component.description.clone(),
            function,
            parameter_mappings: component.parameter_mappings().clone(),
            input_components: component.input_components().iter().copied().collect(),
            output_components: component.output_components().iter().copied().collect(),
        });
        component.id
    }

    fn mapping_instance(&mut self, instance: &MappingAttributePathInstance) -> Uuid {
        if !self.instances.claim(instance.id) {
            return instance.id;
        }

        let attribute_path = self.attribute_path(&instance.attribute_path);
        let filter = instance.filter.as_ref().map(|filter| {
            if self.filters.claim(filter.id) {
                self.filters.push(Filter::clone(filter));
            }
            filter.id
        });

        self.instances.push(AttributePathInstanceRecord::Mapping {
            id: instance.id,
            name: instance.name.clone(),
            attribute_path,
            filter,
            ordinal: instance.ordinal(),
        });
        instance.id
    }

    fn schema_instance(&mut self, instance: &SchemaAttributePathInstance) -> Uuid {
        if !self.instances.claim(instance.id) {
            return instance.id;
        }

        let attribute_path = self.attribute_path(&instance.attribute_path);
        let sub_schema = instance.sub_schema.as_ref().map(|sub_schema| {
            if self.schemas.claim(sub_schema.id) {
                let record = self.schema(sub_schema);
                self.schemas.push(record);
            }
            sub_schema.id
        });

        self.instances.push(AttributePathInstanceRecord::Schema {
            id: instance.id,
            name: instance.name.clone(),
            attribute_path,
            sub_schema,
            required: instance.required,
            multivalue: instance.multivalue,
        });
        instance.id
    }

    fn content_schema(&mut self, content_schema: &ContentSchema) -> Uuid {
        if !self.content_schemas.claim(content_schema.id) {
            return content_schema.id;
        }

        let record_identifier_attribute_path = content_schema
            .record_identifier_attribute_path
            .as_ref()
            .map(|path| self.attribute_path(path));
        let key_attribute_paths = content_schema
            .utilised_key_attribute_paths()
            .iter()
            .map(|path| self.attribute_path(path))
            .collect();
        let value_attribute_path = content_schema
            .value_attribute_path
            .as_ref()
            .map(|path| self.attribute_path(path));

        self.content_schemas.push(ContentSchemaRecord {
            id: content_schema.id,
            name: content_schema.name.clone(),
            record_identifier_attribute_path,
            key_attribute_paths,
            ordered_key_attribute_paths: content_schema.encoded_key_attribute_paths(),
            value_attribute_path,
        });
        content_schema.id
    }

    fn mapping(&mut self, mapping: &Mapping) -> MappingRecord {
        let input_attribute_paths = mapping
            .input_attribute_paths()
            .iter()
            .map(|instance| self.mapping_instance(instance))
            .collect();
        let output_attribute_path = mapping
            .output_attribute_path()
            .map(|instance| self.mapping_instance(instance));
        let transformation = mapping
            .transformation()
            .map(|component| self.component(component));

        MappingRecord {
            id: mapping.id,
            name: mapping.name.clone(),
            input_attribute_paths,
            output_attribute_path,
            transformation,
        }
    }

    /// Record for `schema`; sub schemas land in `self.schemas`
    fn schema(&mut self, schema: &Schema) -> SchemaRecord {
        self.schemas.claim(schema.id);

        let attribute_paths = schema
            .attribute_paths()
            .iter()
            .map(|instance| self.schema_instance(instance))
            .collect();
        let record_class = schema.record_class.as_ref().map(|clasz| {
            if self.claszes.claim(clasz.id) {
                self.claszes.push(clasz.clone());
            }
            clasz.id
        });
        let content_schema = schema
            .content_schema
            .as_ref()
            .map(|content_schema| self.content_schema(content_schema));

        SchemaRecord {
            id: schema.id,
            name: schema.name.clone(),
            base_uri: schema.base_uri.clone(),
            attribute_paths,
            record_class,
            content_schema,
        }
    }

    fn into_mapping_document(self, mapping: MappingRecord) -> MappingDocument {
        MappingDocument {
            mapping,
            attributes: self.attributes.rows,
            attribute_paths: self.attribute_paths.rows,
            filters: self.filters.rows,
            attribute_path_instances: self.instances.rows,
            functions: self.functions.rows,
            components: self.components.rows,
        }
    }

    fn into_schema_document(self, root: Uuid, schema: SchemaRecord) -> SchemaDocument {
        SchemaDocument {
            schema,
            schemas: self
                .schemas
                .rows
                .into_iter()
                .filter(|record| record.id != root)
                .collect(),
            attributes: self.attributes.rows,
            attribute_paths: self.attribute_paths.rows,
            attribute_path_instances: self.instances.rows,
            content_schemas: self.content_schemas.rows,
            claszes: self.claszes.rows,
        }
    }
}
