//! Mapping persistence tests
//!
//! Builds the "full name" mapping (first name and family name cleaned up and
//! concatenated into foaf:name), persists it and checks the reloaded graph.

use data_mapping_sdk::models::binding::{
    PREVIOUS_COMPONENT_OUTPUT, TRANSFORMATION_OUTPUT_VARIABLE, component_output_reference,
};
use data_mapping_sdk::{
    Attribute, AttributePath, CacheState, Component, DocumentFormat, Function, Mapping,
    MappingAttributePathInstance, MemoryStorageBackend, ModelLoader, ModelSaver, StorageBackend,
    WorkspaceConfig,
};
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

struct FullNameMapping {
    mapping: Mapping,
    prepare_first_name: Uuid,
    prepare_family_name: Uuid,
    full_name: Uuid,
}

fn attribute(uri: &str, name: &str) -> Arc<Attribute> {
    Arc::new(Attribute::new(uri, Some(name)))
}

/// replace -> trim -> lower_case, bound to a single transformation input
fn cleanup_transformation() -> Arc<Function> {
    let replace = Arc::new(
        Function::atomic("replace")
            .with_description("replace certain parts of a given string that matches a certain regex")
            .with_parameters(["inputString", "regex", "replaceString"])
            .with_function_description(serde_json::json!({
                "name": "replace",
                "dsl": "metafacture",
                "reference": "replace"
            })),
    );
    let trim = Arc::new(
        Function::atomic("trim")
            .with_description("removes leading and trailing whitespaces from a given string")
            .with_parameters(["inputString"]),
    );
    let lower_case = Arc::new(
        Function::atomic("lower_case")
            .with_description("lower cases all characters of a given string")
            .with_parameters(["inputString"]),
    );

    let mut replace_component = Component::new(replace).with_name("replace");
    replace_component.add_parameter_mapping("inputString", "transformationInputString");
    replace_component.add_parameter_mapping("regex", "\\.");
    replace_component.add_parameter_mapping("replaceString", ":");

    let mut trim_component = Component::new(trim).with_name("trim");
    trim_component.add_parameter_mapping("inputString", PREVIOUS_COMPONENT_OUTPUT);

    let mut lower_case_component = Component::new(lower_case).with_name("lower case");
    lower_case_component.add_parameter_mapping("inputString", PREVIOUS_COMPONENT_OUTPUT);

    let (replace_id, trim_id, lower_case_id) =
        (replace_component.id, trim_component.id, lower_case_component.id);

    let mut transformation = Function::transformation("my cleanup")
        .with_description("transformation components to clean up a string")
        .with_parameters(["transformationInputString"]);
    let graph = transformation
        .as_transformation_mut()
        .expect("transformation has a component graph");
    graph.set_components(vec![replace_component, trim_component, lower_case_component]);
    graph.connect(replace_id, trim_id);
    graph.connect(trim_id, lower_case_id);

    Arc::new(transformation)
}

fn full_name_mapping() -> FullNameMapping {
    let creator = attribute("http://purl.org/dc/terms/creator", "creator");
    let first_name = attribute("http://xmlns.com/foaf/0.1/firstName", "firstName");
    let family_name = attribute("http://xmlns.com/foaf/0.1/familyName", "familyName");
    let name = attribute("http://xmlns.com/foaf/0.1/name", "name");

    let first_name_path = Arc::new(AttributePath::from_attributes(vec![creator.clone(), first_name]));
    let family_name_path = Arc::new(AttributePath::from_attributes(vec![creator.clone(), family_name]));
    let name_path = Arc::new(AttributePath::from_attributes(vec![creator, name]));

    let cleanup = cleanup_transformation();

    let mut prepare_first_name = Component::new(cleanup.clone()).with_name("prepare first name");
    prepare_first_name.add_parameter_mapping("transformationInputString", "firstName");

    let mut prepare_family_name = Component::new(cleanup).with_name("prepare family name");
    prepare_family_name.add_parameter_mapping("transformationInputString", "familyName");

    let concat = Arc::new(
        Function::atomic("concat")
            .with_description("concatenates two given string")
            .with_parameters(["firstString", "secondString"]),
    );
    let mut full_name = Component::new(concat).with_name("full name");
    full_name.add_parameter_mapping("firstString", component_output_reference(prepare_first_name.id));
    full_name.add_parameter_mapping("secondString", component_output_reference(prepare_family_name.id));

    let ids = (prepare_first_name.id, prepare_family_name.id, full_name.id);

    let mut transformation = Function::transformation("my transformation")
        .with_description("transformation which makes use of three functions")
        .with_parameters(["firstName", "familyName"]);
    let graph = transformation
        .as_transformation_mut()
        .expect("transformation has a component graph");
    graph.set_components(vec![prepare_first_name, prepare_family_name, full_name]);
    graph.connect(ids.0, ids.2);
    graph.connect(ids.1, ids.2);

    let mut root = Component::new(Arc::new(transformation)).with_name("prepare");
    root.add_parameter_mapping("firstName", first_name_path.to_path_string());
    root.add_parameter_mapping("familyName", family_name_path.to_path_string());
    root.add_parameter_mapping(TRANSFORMATION_OUTPUT_VARIABLE, name_path.to_path_string());

    let mut first_name_input = MappingAttributePathInstance::new(first_name_path).with_name("first name");
    first_name_input.set_ordinal(Some(0)).unwrap();
    let family_name_input = MappingAttributePathInstance::new(family_name_path).with_name("family name");

    let mut mapping = Mapping::new().with_name("my mapping");
    mapping.add_input_attribute_path(first_name_input);
    mapping.add_input_attribute_path(family_name_input);
    mapping.set_output_attribute_path(Some(MappingAttributePathInstance::new(name_path).with_name("name")));
    mapping.set_transformation(Some(Arc::new(root)));

    FullNameMapping {
        mapping,
        prepare_first_name: ids.0,
        prepare_family_name: ids.1,
        full_name: ids.2,
    }
}

fn path_strings(mapping: &Mapping) -> Vec<String> {
    mapping
        .input_attribute_paths()
        .iter()
        .chain(mapping.output_attribute_path())
        .map(|instance| instance.attribute_path.to_path_string())
        .collect()
}

fn assert_reloaded(original: &FullNameMapping, loaded: &Mapping) {
    // Reloaded paths decode their order lazily
    for instance in loaded.input_attribute_paths() {
        assert_eq!(instance.attribute_path.cache_state(), CacheState::Unloaded);
    }

    assert_eq!(path_strings(loaded), path_strings(&original.mapping));
    assert_eq!(
        path_strings(loaded)[0],
        "http://purl.org/dc/terms/creator\u{1E}http://xmlns.com/foaf/0.1/firstName"
    );

    let inputs = loaded.input_attribute_paths();
    assert!(Arc::ptr_eq(
        &inputs[0].attribute_path.attributes()[0],
        &inputs[1].attribute_path.attributes()[0]
    ));
    assert_eq!(inputs[0].ordinal(), Some(0));
    assert_eq!(inputs[1].ordinal(), None);

    let original_root = original.mapping.transformation().unwrap();
    let root = loaded.transformation().unwrap();
    assert_eq!(root.parameter_mappings(), original_root.parameter_mappings());

    let graph = root.function().unwrap().as_transformation().unwrap();
    assert_eq!(graph.len(), 3);
    let full_name = graph.component(original.full_name).unwrap();
    assert_eq!(full_name.input_components().len(), 2);
    assert!(full_name.input_components().contains(&original.prepare_first_name));
    assert!(full_name.input_components().contains(&original.prepare_family_name));
    assert_eq!(
        full_name.parameter_mapping("firstString"),
        Some(component_output_reference(original.prepare_first_name).as_str())
    );

    let exported = graph.component_graph();
    assert_eq!(exported.node_count(), 3);
    assert_eq!(exported.edge_count(), 2);
    assert!(exported.contains_edge(original.prepare_first_name, original.full_name));
    assert!(exported.contains_edge(original.prepare_family_name, original.full_name));

    // Both prepare components wrap one shared cleanup transformation
    let first = graph.component(original.prepare_first_name).unwrap().function().unwrap();
    let family = graph.component(original.prepare_family_name).unwrap().function().unwrap();
    assert!(Arc::ptr_eq(first, family));
    assert_eq!(first.components().len(), 3);

    assert_eq!(loaded, &original.mapping);
}

#[test]
fn test_full_name_mapping_roundtrip_yaml() {
    let rt = runtime();
    rt.block_on(async {
        let backend = Arc::new(MemoryStorageBackend::new());
        let original = full_name_mapping();

        let saver = ModelSaver::new(backend.clone());
        let path = saver.save_mapping("workspace", &original.mapping).await.unwrap();
        assert!(path.ends_with(".yaml"));

        let loader = ModelLoader::new(backend);
        let loaded = loader.load_mapping(&path).await.unwrap();
        assert_reloaded(&original, &loaded);
    });
}

#[test]
fn test_full_name_mapping_roundtrip_json() {
    let rt = runtime();
    rt.block_on(async {
        let backend = Arc::new(MemoryStorageBackend::new());
        let original = full_name_mapping();
        let config = WorkspaceConfig::new()
            .with_mappings_dir("model/mappings")
            .with_format(DocumentFormat::Json);

        let saver = ModelSaver::with_config(backend.clone(), config.clone());
        let path = saver.save_mapping("workspace", &original.mapping).await.unwrap();
        assert_eq!(
            path,
            format!("workspace/model/mappings/{}.json", original.mapping.id)
        );

        let loader = ModelLoader::with_config(backend, config);
        let result = loader.load_mappings("workspace").await.unwrap();
        assert!(result.failures.is_empty());
        assert_eq!(result.loaded.len(), 1);
        assert_reloaded(&original, &result.loaded[0]);
    });
}

#[test]
fn test_saving_twice_writes_identical_documents() {
    let rt = runtime();
    rt.block_on(async {
        let backend = Arc::new(MemoryStorageBackend::new());
        let original = full_name_mapping();
        let saver = ModelSaver::new(backend.clone());
        let loader = ModelLoader::new(backend.clone());

        let path = saver.save_mapping("workspace", &original.mapping).await.unwrap();
        let first = backend.read_file(&path).await.unwrap();

        let loaded = loader.load_mapping(&path).await.unwrap();
        saver.save_mapping("workspace", &loaded).await.unwrap();
        let second = backend.read_file(&path).await.unwrap();

        assert_eq!(first, second);
    });
}

#[cfg(feature = "native-fs")]
mod filesystem_tests {
    use super::*;
    use data_mapping_sdk::FileSystemStorageBackend;
    use tempfile::TempDir;

    #[test]
    fn test_full_name_mapping_roundtrip_on_disk() {
        let rt = runtime();
        rt.block_on(async {
            let temp = TempDir::new().unwrap();
            let backend = Arc::new(FileSystemStorageBackend::new(temp.path()));
            let original = full_name_mapping();

            let saver = ModelSaver::new(backend.clone());
            let path = saver.save_mapping("workspace", &original.mapping).await.unwrap();
            assert!(temp.path().join(&path).is_file());

            let loader = ModelLoader::new(backend);
            let loaded = loader.load_mapping(&path).await.unwrap();
            assert_reloaded(&original, &loaded);
        });
    }
}
