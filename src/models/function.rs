//! Function and transformation models
//!
//! A function is either atomic, executed by the engine from its opaque
//! description, or a transformation realized by a private graph of components.

use petgraph::graphmap::DiGraphMap;
use tracing::debug;
use uuid::Uuid;

use super::component::Component;

/// Named, parameterized transformation unit
///
/// Equality is structural and does not compare ids.
///
/// # Example
///
/// ```rust
/// use data_mapping_sdk::models::Function;
///
/// let lower_case = Function::atomic("lower_case").with_parameters(["inputString"]);
/// assert!(!lower_case.is_transformation());
/// assert_eq!(lower_case.parameters(), &["inputString".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct Function {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    parameters: Vec<String>,
    pub kind: FunctionKind,
}

/// The two kinds of function
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    /// Primitive executed by the engine
    Atomic {
        function_description: Option<serde_json::Value>,
    },
    /// Composite of components
    Transformation(ComponentGraph),
}

impl Function {
    /// Create an atomic function with a fresh id
    pub fn atomic(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            kind: FunctionKind::Atomic {
                function_description: None,
            },
        }
    }

    /// Create a transformation with a fresh id and no components
    pub fn transformation(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            kind: FunctionKind::Transformation(ComponentGraph::new()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the engine-interpreted description of an atomic function
    ///
    /// Ignored for transformations.
    pub fn with_function_description(mut self, description: serde_json::Value) -> Self {
        match &mut self.kind {
            FunctionKind::Atomic {
                function_description,
            } => *function_description = Some(description),
            FunctionKind::Transformation(_) => {
                debug!(function = %self.id, "transformations carry no function description");
            }
        }
        self
    }

    /// Copy this function under a new id
    pub fn with_id(&self, id: Uuid) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Formal parameters, in order
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Replace the formal parameters; a no-op when they are unchanged
    pub fn set_parameters(&mut self, parameters: Vec<String>) -> bool {
        if self.parameters == parameters {
            return false;
        }

        self.parameters = parameters;
        true
    }

    pub fn add_parameter(&mut self, parameter: impl Into<String>) {
        self.parameters.push(parameter.into());
    }

    pub fn is_transformation(&self) -> bool {
        matches!(self.kind, FunctionKind::Transformation(_))
    }

    pub fn function_description(&self) -> Option<&serde_json::Value> {
        match &self.kind {
            FunctionKind::Atomic {
                function_description,
            } => function_description.as_ref(),
            FunctionKind::Transformation(_) => None,
        }
    }

    /// The component graph, if this is a transformation
    pub fn as_transformation(&self) -> Option<&ComponentGraph> {
        match &self.kind {
            FunctionKind::Transformation(graph) => Some(graph),
            FunctionKind::Atomic { .. } => None,
        }
    }

    pub fn as_transformation_mut(&mut self) -> Option<&mut ComponentGraph> {
        match &mut self.kind {
            FunctionKind::Transformation(graph) => Some(graph),
            FunctionKind::Atomic { .. } => None,
        }
    }

    /// Components of a transformation; empty for atomic functions
    pub fn components(&self) -> &[Component] {
        self.as_transformation()
            .map(ComponentGraph::components)
            .unwrap_or_default()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.parameters == other.parameters
            && self.kind == other.kind
    }
}

/// Arena of the components a transformation owns
///
/// Components are addressed by id. Edges stay id sets on the components, so the
/// graph may contain cycles and references to components outside the arena; the
/// execution engine decides what to make of them.
#[derive(Debug, Clone, Default)]
pub struct ComponentGraph {
    components: Vec<Component>,
}

impl ComponentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, id: Uuid) -> Option<&Component> {
        self.components.iter().find(|component| component.id == id)
    }

    pub fn component_mut(&mut self, id: Uuid) -> Option<&mut Component> {
        self.components.iter_mut().find(|component| component.id == id)
    }

    /// Add a component; a no-op if a component with the same id is present
    pub fn add_component(&mut self, component: Component) -> bool {
        if self.component(component.id).is_some() {
            return false;
        }

        self.components.push(component);
        true
    }

    /// Remove a component
    ///
    /// Edges of other components pointing at it are left alone.
    pub fn remove_component(&mut self, id: Uuid) -> Option<Component> {
        let position = self.components.iter().position(|component| component.id == id)?;
        Some(self.components.remove(position))
    }

    /// Replace all components, keeping the first component for each id
    pub fn set_components(&mut self, components: Vec<Component>) {
        self.components.clear();
        for component in components {
            self.add_component(component);
        }
    }

    /// Wire `upstream` into `downstream` on both ends
    ///
    /// Only endpoints present in this graph are updated. Returns whether any edge
    /// was added.
    pub fn connect(&mut self, upstream: Uuid, downstream: Uuid) -> bool {
        let mut changed = false;

        match self.component_mut(upstream) {
            Some(component) => changed |= component.add_output_component(downstream),
            None => debug!(component = %upstream, "upstream component not part of this transformation"),
        }

        match self.component_mut(downstream) {
            Some(component) => changed |= component.add_input_component(upstream),
            None => {
                debug!(component = %downstream, "downstream component not part of this transformation")
            }
        }

        changed
    }

    /// Export the declared wiring as a directed graph of component ids
    ///
    /// An edge `a -> b` is present if `a` lists `b` as an output or `b` lists `a`
    /// as an input. Nothing is validated: ids outside the arena become nodes and
    /// cycles are kept.
    pub fn component_graph(&self) -> DiGraphMap<Uuid, ()> {
        let mut graph = DiGraphMap::new();

        for component in &self.components {
            graph.add_node(component.id);
        }

        for component in &self.components {
            for output in component.output_components() {
                graph.add_edge(component.id, *output, ());
            }
            for input in component.input_components() {
                graph.add_edge(*input, component.id, ());
            }
        }

        graph
    }
}

impl PartialEq for ComponentGraph {
    fn eq(&self, other: &Self) -> bool {
        self.components.len() == other.components.len()
            && self.components.iter().all(|component| {
                other
                    .component(component.id)
                    .is_some_and(|candidate| candidate == component)
            })
    }
}
