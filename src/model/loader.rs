//! Model loading functionality
//!
//! Loads mappings and schemas from storage backends and rebuilds their entity
//! graphs. Attribute paths come back unloaded and decode their order on first
//! read; entities referenced several times come back as one shared `Arc`.

use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::records::{
    self, AttributePathInstanceRecord, AttributePathRecord, ComponentRecord, ContentSchemaRecord,
    FunctionKindRecord, FunctionRecord, MappingDocument, SchemaDocument, SchemaRecord,
};
use crate::config::{DocumentFormat, WorkspaceConfig};
use crate::models::{
    Attribute, AttributePath, Clasz, Component, ComponentGraph, ContentSchema, Filter, Function,
    FunctionKind, Mapping, MappingAttributePathInstance, Schema, SchemaAttributePathInstance,
};
use crate::storage::{StorageBackend, StorageError};

/// Model loader that uses a storage backend
pub struct ModelLoader<B: StorageBackend> {
    storage: B,
    config: WorkspaceConfig,
}

/// Documents loaded from one directory
#[derive(Debug)]
pub struct LoadResult<T> {
    pub loaded: Vec<T>,
    /// Documents that could not be read or resolved
    pub failures: Vec<LoadFailure>,
}

#[derive(Debug)]
pub struct LoadFailure {
    pub path: String,
    pub error: StorageError,
}

impl<B: StorageBackend> ModelLoader<B> {
    /// Create a new model loader with the default workspace layout
    pub fn new(storage: B) -> Self {
        Self::with_config(storage, WorkspaceConfig::default())
    }

    pub fn with_config(storage: B, config: WorkspaceConfig) -> Self {
        Self { storage, config }
    }

    /// Load one mapping document
    pub async fn load_mapping(&self, file_path: &str) -> Result<Mapping, StorageError> {
        let document: MappingDocument = self.read_document(file_path).await?;
        Resolver::for_mapping(file_path, &document)?.mapping(&document)
    }

    /// Load one schema document
    pub async fn load_schema(&self, file_path: &str) -> Result<Schema, StorageError> {
        let document: SchemaDocument = self.read_document(file_path).await?;
        Resolver::for_schema(file_path, &document)?.schema(&document)
    }

    /// Load every mapping document of a workspace
    ///
    /// Documents that fail to load are logged and collected in
    /// [`LoadResult::failures`].
    pub async fn load_mappings(&self, workspace_path: &str) -> Result<LoadResult<Mapping>, StorageError> {
        let files = self.document_files(workspace_path, &self.config.mappings_dir).await?;
        let mut result = LoadResult {
            loaded: Vec::new(),
            failures: Vec::new(),
        };

        for file_path in files {
            match self.load_mapping(&file_path).await {
                Ok(mapping) => result.loaded.push(mapping),
                Err(error) => {
                    warn!("Failed to load mapping from {}: {}", file_path, error);
                    result.failures.push(LoadFailure {
                        path: file_path,
                        error,
                    });
                }
            }
        }

        info!(
            "Loaded {} mappings ({} failed) from workspace {}",
            result.loaded.len(),
            result.failures.len(),
            workspace_path
        );
        Ok(result)
    }

    /// Load every schema document of a workspace
    pub async fn load_schemas(&self, workspace_path: &str) -> Result<LoadResult<Schema>, StorageError> {
        let files = self.document_files(workspace_path, &self.config.schemas_dir).await?;
        let mut result = LoadResult {
            loaded: Vec::new(),
            failures: Vec::new(),
        };

        for file_path in files {
            match self.load_schema(&file_path).await {
                Ok(schema) => result.loaded.push(schema),
                Err(error) => {
                    warn!("Failed to load schema from {}: {}", file_path, error);
                    result.failures.push(LoadFailure {
                        path: file_path,
                        error,
                    });
                }
            }
        }

        info!(
            "Loaded {} schemas ({} failed) from workspace {}",
            result.loaded.len(),
            result.failures.len(),
            workspace_path
        );
        Ok(result)
    }

    async fn document_files(&self, workspace_path: &str, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir_path = format!("{}/{}", workspace_path.trim_end_matches('/'), dir.trim_matches('/'));
        if !self.storage.dir_exists(&dir_path).await? {
            debug!("No document directory {}", dir_path);
            return Ok(Vec::new());
        }

        let files = self.storage.list_files(&dir_path).await?;
        Ok(files
            .into_iter()
            .filter(|name| DocumentFormat::from_file_name(name).is_some())
            .map(|name| format!("{}/{}", dir_path, name))
            .collect())
    }

    async fn read_document<T: DeserializeOwned>(&self, file_path: &str) -> Result<T, StorageError> {
        let content = self.storage.read_file(file_path).await?;
        let format = DocumentFormat::from_file_name(file_path).unwrap_or(self.config.format);
        records::decode(&content, format)
    }
}

/// Rebuilds entities from the records of one document
struct Resolver<'a> {
    document: &'a str,
    attribute_paths: HashMap<Uuid, Arc<AttributePath>>,
    instances: HashMap<Uuid, &'a AttributePathInstanceRecord>,
    filters: HashMap<Uuid, Arc<Filter>>,
    function_records: HashMap<Uuid, &'a FunctionRecord>,
    component_records: HashMap<Uuid, &'a ComponentRecord>,
    functions: HashMap<Uuid, Arc<Function>>,
    schema_records: HashMap<Uuid, &'a SchemaRecord>,
    schemas: HashMap<Uuid, Arc<Schema>>,
    content_schemas: HashMap<Uuid, &'a ContentSchemaRecord>,
    claszes: HashMap<Uuid, &'a Clasz>,
    resolving: HashSet<Uuid>,
}

fn index<'a, T>(rows: &'a [T], id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, &'a T> {
    rows.iter().map(|row| (id(row), row)).collect()
}

impl<'a> Resolver<'a> {
    fn new(
        document: &'a str,
        attributes: &'a [Attribute],
        attribute_paths: &'a [AttributePathRecord],
        instances: &'a [AttributePathInstanceRecord],
    ) -> Result<Self, StorageError> {
        let attributes: HashMap<Uuid, Arc<Attribute>> = attributes
            .iter()
            .map(|attribute| (attribute.id, Arc::new(attribute.clone())))
            .collect();

        let mut resolver = Self {
            document,
            attribute_paths: HashMap::new(),
            instances: index(instances, AttributePathInstanceRecord::id),
            filters: HashMap::new(),
            function_records: HashMap::new(),
            component_records: HashMap::new(),
            functions: HashMap::new(),
            schema_records: HashMap::new(),
            schemas: HashMap::new(),
            content_schemas: HashMap::new(),
            claszes: HashMap::new(),
            resolving: HashSet::new(),
        };

        for record in attribute_paths {
            let utilised = record
                .attributes
                .iter()
                .map(|id| {
                    attributes
                        .get(id)
                        .cloned()
                        .ok_or_else(|| resolver.dangling("attribute", *id))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let path = AttributePath::from_stored(record.id, record.ordered_attributes.clone(), utilised);
            resolver.attribute_paths.insert(record.id, Arc::new(path));
        }

        Ok(resolver)
    }

    fn for_mapping(document: &'a str, content: &'a MappingDocument) -> Result<Self, StorageError> {
        let mut resolver = Self::new(
            document,
            &content.attributes,
            &content.attribute_paths,
            &content.attribute_path_instances,
        )?;
        resolver.filters = content
            .filters
            .iter()
            .map(|filter| (filter.id, Arc::new(filter.clone())))
            .collect();
        resolver.function_records = index(&content.functions, |record| record.id);
        resolver.component_records = index(&content.components, |record| record.id);
        Ok(resolver)
    }

    fn for_schema(document: &'a str, content: &'a SchemaDocument) -> Result<Self, StorageError> {
        let mut resolver = Self::new(
            document,
            &content.attributes,
            &content.attribute_paths,
            &content.attribute_path_instances,
        )?;
        resolver.schema_records = index(&content.schemas, |record| record.id);
        resolver.content_schemas = index(&content.content_schemas, |record| record.id);
        resolver.claszes = index(&content.claszes, |clasz| clasz.id);
        Ok(resolver)
    }

    fn dangling(&self, kind: &'static str, id: Uuid) -> StorageError {
        StorageError::DanglingReference {
            document: self.document.to_string(),
            kind,
            id,
        }
    }

    fn invalid(&self, message: String) -> StorageError {
        StorageError::SerializationError(format!("{}: {}", self.document, message))
    }

    fn attribute_path(&self, id: Uuid) -> Result<Arc<AttributePath>, StorageError> {
        self.attribute_paths
            .get(&id)
            .cloned()
            .ok_or_else(|| self.dangling("attribute path", id))
    }

    fn function(&mut self, id: Uuid) -> Result<Arc<Function>, StorageError> {
        if let Some(function) = self.functions.get(&id) {
            return Ok(function.clone());
        }

        let record = *self
            .function_records
            .get(&id)
            .ok_or_else(|| self.dangling("function", id))?;
        if !self.resolving.insert(id) {
            return Err(self.invalid(format!("function {} contains itself", id)));
        }

        let kind = match &record.kind {
            FunctionKindRecord::Function {
                function_description,
            } => FunctionKind::Atomic {
                function_description: function_description.clone(),
            },
            FunctionKindRecord::Transformation { components } => {
                let mut graph = ComponentGraph::new();
                for component in components {
                    let component = self.component(*component)?;
                    graph.add_component(component);
                }
                FunctionKind::Transformation(graph)
            }
        };
        self.resolving.remove(&id);

        let mut function = Function::atomic(record.name.clone());
        function.id = record.id;
        function.description = record.description.clone();
        function.set_parameters(record.parameters.clone());
        function.kind = kind;

        let function = Arc::new(function);
        self.functions.insert(id, function.clone());
        Ok(function)
    }

    /// Rebuild a component; edge ids are kept whether or not they resolve
    fn component(&mut self, id: Uuid) -> Result<Component, StorageError> {
        let record = *self
            .component_records
            .get(&id)
            .ok_or_else(|| self.dangling("component", id))?;

        let mut component = Component::empty(record.id);
        component.name = record.name.clone();
        component.description = record.description.clone();
        if let Some(function) = record.function {
            component.set_function(Some(self.function(function)?));
        }
        component.set_parameter_mappings(record.parameter_mappings.clone());
        component.set_input_components(record.input_components.iter().copied());
        component.set_output_components(record.output_components.iter().copied());
        Ok(component)
    }

    fn mapping_instance(&self, id: Uuid) -> Result<MappingAttributePathInstance, StorageError> {
        let record = self
            .instances
            .get(&id)
            .ok_or_else(|| self.dangling("attribute path instance", id))?;

        let AttributePathInstanceRecord::Mapping {
            name,
            attribute_path,
            filter,
            ordinal,
            ..
        } = record
        else {
            return Err(self.invalid(format!("attribute path instance {} is not a mapping instance", id)));
        };

        let mut instance = MappingAttributePathInstance::with_id(id, self.attribute_path(*attribute_path)?);
        instance.name = name.clone();
        if let Some(filter) = filter {
            let resolved = self
                .filters
                .get(filter)
                .cloned()
                .ok_or_else(|| self.dangling("filter", *filter))?;
            instance.set_filter(Some(resolved));
        }
        instance
            .set_ordinal(*ordinal)
            .map_err(|e| self.invalid(format!("attribute path instance {}: {}", id, e)))?;
        Ok(instance)
    }

    fn mapping(&mut self, document: &MappingDocument) -> Result<Mapping, StorageError> {
        let record = &document.mapping;
        let mut mapping = Mapping::with_id(record.id);
        mapping.name = record.name.clone();

        for id in &record.input_attribute_paths {
            mapping.add_input_attribute_path(self.mapping_instance(*id)?);
        }
        if let Some(id) = record.output_attribute_path {
            mapping.set_output_attribute_path(Some(self.mapping_instance(id)?));
        }
        if let Some(id) = record.transformation {
            mapping.set_transformation(Some(Arc::new(self.component(id)?)));
        }

        debug!(
            mapping = %mapping.id,
            functions = self.functions.len(),
            "resolved mapping document {}", self.document
        );
        Ok(mapping)
    }

    fn schema_instance(&mut self, id: Uuid) -> Result<SchemaAttributePathInstance, StorageError> {
        let record = *self
            .instances
            .get(&id)
            .ok_or_else(|| self.dangling("attribute path instance", id))?;

        let AttributePathInstanceRecord::Schema {
            name,
            attribute_path,
            sub_schema,
            required,
            multivalue,
            ..
        } = record
        else {
            return Err(self.invalid(format!("attribute path instance {} is not a schema instance", id)));
        };

        let mut instance = SchemaAttributePathInstance::with_id(id, self.attribute_path(*attribute_path)?)
            .with_required(*required)
            .with_multivalue(*multivalue);
        instance.name = name.clone();
        if let Some(sub_schema) = sub_schema {
            instance.sub_schema = Some(self.sub_schema(*sub_schema)?);
        }
        Ok(instance)
    }

    fn content_schema(&self, id: Uuid) -> Result<ContentSchema, StorageError> {
        let record = self
            .content_schemas
            .get(&id)
            .ok_or_else(|| self.dangling("content schema", id))?;

        let key_attribute_paths = record
            .key_attribute_paths
            .iter()
            .map(|path| self.attribute_path(*path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut content_schema =
            ContentSchema::from_stored(id, record.ordered_key_attribute_paths.clone(), key_attribute_paths);
        content_schema.name = record.name.clone();
        content_schema.record_identifier_attribute_path = record
            .record_identifier_attribute_path
            .map(|path| self.attribute_path(path))
            .transpose()?;
        content_schema.value_attribute_path = record
            .value_attribute_path
            .map(|path| self.attribute_path(path))
            .transpose()?;
        Ok(content_schema)
    }

    fn sub_schema(&mut self, id: Uuid) -> Result<Arc<Schema>, StorageError> {
        if let Some(schema) = self.schemas.get(&id) {
            return Ok(schema.clone());
        }

        let record = *self
            .schema_records
            .get(&id)
            .ok_or_else(|| self.dangling("schema", id))?;
        let schema = Arc::new(self.schema_from_record(record)?);
        self.schemas.insert(id, schema.clone());
        Ok(schema)
    }

    fn schema_from_record(&mut self, record: &SchemaRecord) -> Result<Schema, StorageError> {
        if !self.resolving.insert(record.id) {
            return Err(self.invalid(format!("schema {} contains itself", record.id)));
        }

        let instances = record
            .attribute_paths
            .iter()
            .map(|id| self.schema_instance(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let mut schema = Schema::from_stored(record.id, instances);
        schema.name = record.name.clone();
        schema.base_uri = record.base_uri.clone();
        if let Some(clasz_id) = record.record_class {
            let resolved = self
                .claszes
                .get(&clasz_id)
                .map(|clasz| (*clasz).clone())
                .ok_or_else(|| self.dangling("class", clasz_id))?;
            schema.set_record_class(Some(resolved));
        }
        if let Some(content_schema) = record.content_schema {
            schema.set_content_schema(Some(self.content_schema(content_schema)?));
        }

        self.resolving.remove(&record.id);
        Ok(schema)
    }

    fn schema(&mut self, document: &SchemaDocument) -> Result<Schema, StorageError> {
        self.schema_from_record(&document.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSaver;
    use crate::models::binding::PREVIOUS_COMPONENT_OUTPUT;
    use crate::storage::MemoryStorageBackend;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn write(backend: &MemoryStorageBackend, path: &str, content: &str) {
        block_on(backend.write_file(path, content.as_bytes())).unwrap();
    }

    #[test]
    fn test_shared_function_comes_back_shared() {
        let backend = Arc::new(MemoryStorageBackend::new());
        let trim = Arc::new(Function::atomic("trim").with_parameters(["inputString"]));

        let mut transformation = Function::transformation("cleanup");
        let graph = transformation.as_transformation_mut().unwrap();
        let mut first = Component::new(trim.clone());
        first.add_parameter_mapping("inputString", "transformationInputString");
        let mut second = Component::new(trim);
        second.add_parameter_mapping("inputString", PREVIOUS_COMPONENT_OUTPUT);
        let (first_id, second_id) = (first.id, second.id);
        graph.set_components(vec![first, second]);
        graph.connect(first_id, second_id);

        let mut mapping = Mapping::new();
        mapping.set_transformation(Some(Arc::new(Component::new(Arc::new(transformation)))));

        let saver = ModelSaver::new(backend.clone());
        let path = block_on(saver.save_mapping("ws", &mapping)).unwrap();

        let loader = ModelLoader::new(backend);
        let loaded = block_on(loader.load_mapping(&path)).unwrap();
        assert_eq!(loaded, mapping);

        let root = loaded.transformation().unwrap();
        let graph = root.function().unwrap().as_transformation().unwrap();
        let a = graph.component(first_id).unwrap().function().unwrap();
        let b = graph.component(second_id).unwrap().function().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_dangling_attribute_is_rejected() {
        let backend = MemoryStorageBackend::new();
        let mapping = Uuid::new_v4();
        let path = Uuid::new_v4();
        let missing = Uuid::new_v4();
        write(
            &backend,
            "ws/mappings/bad.yaml",
            &format!(
                "mapping:\n  id: '{mapping}'\nattributePaths:\n  - id: '{path}'\n    attributes: ['{missing}']\n"
            ),
        );

        let loader = ModelLoader::new(backend);
        let err = block_on(loader.load_mapping("ws/mappings/bad.yaml")).unwrap_err();
        assert!(matches!(
            err,
            StorageError::DanglingReference { kind: "attribute", id, .. } if id == missing
        ));
    }

    #[test]
    fn test_unknown_edge_ids_are_kept() {
        let backend = MemoryStorageBackend::new();
        let mapping = Uuid::new_v4();
        let component = Uuid::new_v4();
        let elsewhere = Uuid::new_v4();
        write(
            &backend,
            "ws/mappings/edges.json",
            &serde_json::json!({
                "mapping": {"id": mapping, "transformation": component},
                "components": [{"id": component, "inputComponents": [elsewhere]}]
            })
            .to_string(),
        );

        let loader = ModelLoader::new(backend);
        let loaded = block_on(loader.load_mapping("ws/mappings/edges.json")).unwrap();
        let root = loaded.transformation().unwrap();
        assert!(root.input_components().contains(&elsewhere));
        assert!(root.function().is_none());
    }

    #[test]
    fn test_self_containing_function_is_rejected() {
        let backend = MemoryStorageBackend::new();
        let function = Uuid::new_v4();
        let component = Uuid::new_v4();
        write(
            &backend,
            "ws/mappings/loop.json",
            &serde_json::json!({
                "mapping": {"id": Uuid::new_v4(), "transformation": component},
                "functions": [{"id": function, "name": "loop", "kind": {"type": "transformation", "components": [component]}}],
                "components": [{"id": component, "function": function}]
            })
            .to_string(),
        );

        let loader = ModelLoader::new(backend);
        let err = block_on(loader.load_mapping("ws/mappings/loop.json")).unwrap_err();
        assert!(matches!(err, StorageError::SerializationError(ref message) if message.contains("contains itself")));
    }

    #[test]
    fn test_negative_ordinal_in_document_is_rejected() {
        let backend = MemoryStorageBackend::new();
        let path = Uuid::new_v4();
        let instance = Uuid::new_v4();
        write(
            &backend,
            "ws/mappings/ordinal.json",
            &serde_json::json!({
                "mapping": {"id": Uuid::new_v4(), "inputAttributePaths": [instance]},
                "attributePaths": [{"id": path}],
                "attributePathInstances": [{"type": "mapping", "id": instance, "attributePath": path, "ordinal": -2}]
            })
            .to_string(),
        );

        let loader = ModelLoader::new(backend);
        let err = block_on(loader.load_mapping("ws/mappings/ordinal.json")).unwrap_err();
        assert!(matches!(err, StorageError::SerializationError(ref message) if message.contains("-2")));
    }

    #[test]
    fn test_load_mappings_collects_failures() {
        let backend = Arc::new(MemoryStorageBackend::new());
        let saver = ModelSaver::new(backend.clone());
        block_on(saver.save_mapping("ws", &Mapping::new())).unwrap();
        block_on(saver.save_mapping("ws", &Mapping::new())).unwrap();
        write(&backend, "ws/mappings/broken.yaml", "mapping: [");
        write(&backend, "ws/mappings/notes.txt", "ignored");

        let loader = ModelLoader::new(backend);
        let result = block_on(loader.load_mappings("ws")).unwrap();
        assert_eq!(result.loaded.len(), 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, "ws/mappings/broken.yaml");

        let schemas = block_on(loader.load_schemas("ws")).unwrap();
        assert!(schemas.loaded.is_empty());
        assert!(schemas.failures.is_empty());
    }
}
