//! Component model
//!
//! A component is a named instantiation of a function or transformation inside a
//! transformation graph. Its edges to other components are explicit id sets
//! maintained by the caller; they are never derived from the parameter bindings.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use uuid::Uuid;

use super::function::Function;

/// Bound instance of a function with parameter bindings and graph edges
///
/// Equality is structural over name, function and parameter mappings; the
/// description is documentation only. Edge sets take part by member id only, so two components wired to
/// distinct but structurally equal neighbours are not equal. The component's own
/// id is not compared.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use data_mapping_sdk::models::{Component, Function};
///
/// let trim = Arc::new(Function::atomic("trim").with_parameters(["inputString"]));
/// let mut component = Component::new(trim).with_name("trim first name");
/// component.add_parameter_mapping("inputString", "previousComponent.outputString");
///
/// assert_eq!(
///     component.parameter_mapping("inputString"),
///     Some("previousComponent.outputString")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Component {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    function: Option<Arc<Function>>,
    parameter_mappings: BTreeMap<String, String>,
    input_components: BTreeSet<Uuid>,
    output_components: BTreeSet<Uuid>,
}

impl Component {
    pub fn new(function: Arc<Function>) -> Self {
        let mut component = Self::empty(Uuid::new_v4());
        component.function = Some(function);
        component
    }

    /// Create a component with the given id and no function yet
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            description: None,
            function: None,
            parameter_mappings: BTreeMap::new(),
            input_components: BTreeSet::new(),
            output_components: BTreeSet::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Copy this component under a new id, keeping function, bindings and edges
    pub fn with_id(&self, id: Uuid) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    pub fn function(&self) -> Option<&Arc<Function>> {
        self.function.as_ref()
    }

    pub fn set_function(&mut self, function: Option<Arc<Function>>) {
        self.function = function;
    }

    pub fn parameter_mappings(&self) -> &BTreeMap<String, String> {
        &self.parameter_mappings
    }

    pub fn parameter_mapping(&self, parameter: &str) -> Option<&str> {
        self.parameter_mappings.get(parameter).map(String::as_str)
    }

    /// Replace all parameter mappings; a no-op when they are unchanged
    pub fn set_parameter_mappings(&mut self, parameter_mappings: BTreeMap<String, String>) -> bool {
        if self.parameter_mappings == parameter_mappings {
            return false;
        }

        self.parameter_mappings = parameter_mappings;
        true
    }

    /// Bind `parameter` to a binding expression, returning the previous value
    pub fn add_parameter_mapping(
        &mut self,
        parameter: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.parameter_mappings.insert(parameter.into(), value.into())
    }

    pub fn remove_parameter_mapping(&mut self, parameter: &str) -> Option<String> {
        self.parameter_mappings.remove(parameter)
    }

    pub fn input_components(&self) -> &BTreeSet<Uuid> {
        &self.input_components
    }

    pub fn add_input_component(&mut self, id: Uuid) -> bool {
        self.input_components.insert(id)
    }

    pub fn remove_input_component(&mut self, id: Uuid) -> bool {
        self.input_components.remove(&id)
    }

    pub fn set_input_components(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.input_components = ids.into_iter().collect();
    }

    pub fn output_components(&self) -> &BTreeSet<Uuid> {
        &self.output_components
    }

    pub fn add_output_component(&mut self, id: Uuid) -> bool {
        self.output_components.insert(id)
    }

    pub fn remove_output_component(&mut self, id: Uuid) -> bool {
        self.output_components.remove(&id)
    }

    pub fn set_output_components(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.output_components = ids.into_iter().collect();
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.function == other.function
            && self.parameter_mappings == other.parameter_mappings
            && self.input_components == other.input_components
            && self.output_components == other.output_components
    }
}
