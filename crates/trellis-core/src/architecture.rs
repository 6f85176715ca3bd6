//! Architecture source consumed by the phase planner.

use std::collections::HashSet;

use crate::{
    error::{OrchestratorError, Result},
    models::Component,
};

/// Supplies the declared components of a project.
///
/// [`crate::db::Database`] implements this over the `components` table.
pub trait ArchitectureProvider {
    /// Components in declaration order. An unknown project yields an empty
    /// list.
    fn components(&self, project: &str) -> Result<Vec<Component>>;
}

impl ArchitectureProvider for [Component] {
    fn components(&self, _project: &str) -> Result<Vec<Component>> {
        Ok(self.to_vec())
    }
}

/// Checks a component list before it is stored.
///
/// Names must be non-empty and unique. Dangling dependency names are allowed;
/// the planner drops them.
pub fn validate_components(components: &[Component]) -> Result<()> {
    let mut seen = HashSet::new();
    for component in components {
        let name = component.name.trim();
        if name.is_empty() {
            return Err(OrchestratorError::invalid_input("components")
                .with_reason("component names cannot be empty"));
        }
        if !seen.insert(name) {
            return Err(OrchestratorError::invalid_input("components")
                .with_reason(format!("component '{name}' is declared more than once")));
        }
    }
    Ok(())
}
