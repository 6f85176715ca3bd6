//! Architecture component model.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One declared component of a project's architecture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Component {
    /// Name, unique within the project
    pub name: String,

    /// Free-form label such as `service`, `library` or `ui`
    #[serde(rename = "type", default)]
    pub component_type: String,

    /// Glob patterns of files this component owns
    #[serde(default)]
    pub files: Vec<String>,

    /// Names of the components this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Component {
    /// Convenience constructor used heavily in tests and fixtures.
    pub fn new(name: impl Into<String>, dependencies: &[&str]) -> Self {
        Self {
            name: name.into(),
            component_type: String::new(),
            files: Vec::new(),
            dependencies: dependencies.iter().map(|d| (*d).to_string()).collect(),
        }
    }
}
