//! Binding expression tokens
//!
//! The value of a component parameter mapping is one of:
//!
//! - a canonical attribute path string, i.e. a reference to a record field
//! - a literal constant
//! - a reference to the output of another component: `"<componentId>.outputVariable"`
//!   or [`PREVIOUS_COMPONENT_OUTPUT`]
//!
//! [`TRANSFORMATION_OUTPUT_VARIABLE`] names the parameter whose value is the
//! field the result of a transformation is written to.
//!
//! These tokens are interpreted by the execution engine only. The model never
//! parses binding values and never checks that a referenced component exists.

use uuid::Uuid;

/// Output of the component feeding the current one
pub const PREVIOUS_COMPONENT_OUTPUT: &str = "previousComponent.outputString";

/// Parameter naming the output field of a transformation
pub const TRANSFORMATION_OUTPUT_VARIABLE: &str = "transformationOutputVariable";

/// Suffix appended to a component id to reference that component's output
pub const OUTPUT_VARIABLE_SUFFIX: &str = ".outputVariable";

/// Binding value referencing the output of component `id`
pub fn component_output_reference(id: Uuid) -> String {
    format!("{}{}", id, OUTPUT_VARIABLE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_output_reference() {
        let id = Uuid::parse_str("7b7f3f47-8d3f-4a57-9cc1-2fd2a1c7b9a0").unwrap();
        assert_eq!(
            component_output_reference(id),
            "7b7f3f47-8d3f-4a57-9cc1-2fd2a1c7b9a0.outputVariable"
        );
    }
}
