//! Mapping model
//!
//! A mapping takes a set of input attribute paths and one output attribute path
//! and produces the output value through its root transformation component.

use std::sync::Arc;
use uuid::Uuid;

use super::component::Component;
use super::instance::MappingAttributePathInstance;

/// Unit binding input and output attribute paths to a root component
///
/// Operations perform presence checks only. A mapping without inputs, or whose
/// transformation leaves parameters unbound, is constructible; it fails when the
/// execution engine runs it.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use data_mapping_sdk::models::{Attribute, AttributePath, Mapping, MappingAttributePathInstance};
///
/// let title = Arc::new(Attribute::new("http://purl.org/dc/terms/title", None));
/// let path = Arc::new(AttributePath::from_attributes(vec![title]));
///
/// let mut mapping = Mapping::new().with_name("copy title");
/// mapping.add_input_attribute_path(MappingAttributePathInstance::new(path.clone()));
/// mapping.set_output_attribute_path(Some(MappingAttributePathInstance::new(path)));
///
/// assert_eq!(mapping.input_attribute_paths().len(), 1);
/// assert!(mapping.transformation().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Mapping {
    pub id: Uuid,
    pub name: Option<String>,
    input_attribute_paths: Vec<MappingAttributePathInstance>,
    output_attribute_path: Option<MappingAttributePathInstance>,
    transformation: Option<Arc<Component>>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            input_attribute_paths: Vec::new(),
            output_attribute_path: None,
            transformation: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn input_attribute_paths(&self) -> &[MappingAttributePathInstance] {
        &self.input_attribute_paths
    }

    pub fn input_attribute_path(&self, id: Uuid) -> Option<&MappingAttributePathInstance> {
        self.input_attribute_paths.iter().find(|instance| instance.id == id)
    }

    /// Add an input attribute path instance; a no-op if its id is already present
    pub fn add_input_attribute_path(&mut self, instance: MappingAttributePathInstance) -> bool {
        if self.input_attribute_path(instance.id).is_some() {
            return false;
        }

        self.input_attribute_paths.push(instance);
        true
    }

    pub fn remove_input_attribute_path(&mut self, id: Uuid) -> Option<MappingAttributePathInstance> {
        let position = self
            .input_attribute_paths
            .iter()
            .position(|instance| instance.id == id)?;
        Some(self.input_attribute_paths.remove(position))
    }

    /// Replace all input attribute path instances, keeping the first per id
    pub fn set_input_attribute_paths(&mut self, instances: Vec<MappingAttributePathInstance>) {
        self.input_attribute_paths.clear();
        for instance in instances {
            self.add_input_attribute_path(instance);
        }
    }

    pub fn output_attribute_path(&self) -> Option<&MappingAttributePathInstance> {
        self.output_attribute_path.as_ref()
    }

    pub fn set_output_attribute_path(&mut self, instance: Option<MappingAttributePathInstance>) {
        self.output_attribute_path = instance;
    }

    /// Root component of the transformation
    pub fn transformation(&self) -> Option<&Arc<Component>> {
        self.transformation.as_ref()
    }

    pub fn set_transformation(&mut self, component: Option<Arc<Component>>) {
        self.transformation = component;
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.output_attribute_path == other.output_attribute_path
            && self.transformation == other.transformation
            && self.input_attribute_paths.len() == other.input_attribute_paths.len()
            && self
                .input_attribute_paths
                .iter()
                .all(|instance| other.input_attribute_paths.contains(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, AttributePath, Function};

    fn instance(uri: &str) -> MappingAttributePathInstance {
        let path = AttributePath::from_attributes(vec![Arc::new(Attribute::new(uri, None))]);
        MappingAttributePathInstance::new(Arc::new(path))
    }

    #[test]
    fn test_incomplete_mapping_is_constructible() {
        let mapping = Mapping::new();
        assert!(mapping.input_attribute_paths().is_empty());
        assert!(mapping.output_attribute_path().is_none());

        let mut with_unbound = Mapping::new();
        let concat = Arc::new(Function::atomic("concat").with_parameters(["firstString", "secondString"]));
        with_unbound.set_transformation(Some(Arc::new(Component::new(concat))));
        assert!(with_unbound.transformation().unwrap().parameter_mappings().is_empty());
    }

    #[test]
    fn test_input_paths_unique_by_id() {
        let mut mapping = Mapping::new();
        let first = instance("http://xmlns.com/foaf/0.1/firstName");
        let family = instance("http://xmlns.com/foaf/0.1/familyName");

        assert!(mapping.add_input_attribute_path(first.clone()));
        assert!(!mapping.add_input_attribute_path(first.clone()));
        assert!(mapping.add_input_attribute_path(family.clone()));
        assert_eq!(mapping.input_attribute_paths().len(), 2);

        assert_eq!(mapping.remove_input_attribute_path(first.id), Some(first.clone()));
        assert!(mapping.input_attribute_path(first.id).is_none());
        assert!(mapping.input_attribute_path(family.id).is_some());
    }

    #[test]
    fn test_equality_ignores_input_order() {
        let first = instance("http://xmlns.com/foaf/0.1/firstName");
        let family = instance("http://xmlns.com/foaf/0.1/familyName");

        let mut a = Mapping::new();
        let mut b = Mapping::with_id(a.id);
        a.set_input_attribute_paths(vec![first.clone(), family.clone()]);
        b.set_input_attribute_paths(vec![family, first]);
        assert_eq!(a, b);

        b.set_output_attribute_path(Some(instance("http://xmlns.com/foaf/0.1/name")));
        assert_ne!(a, b);
    }
}
