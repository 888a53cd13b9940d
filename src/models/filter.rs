//! Filter model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque predicate restricting which values of an input attribute path are used
///
/// The expression is interpreted by the execution engine only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filter {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Filter {
    pub fn new(name: Option<&str>, expression: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.map(str::to_string),
            expression: expression.map(str::to_string),
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}
