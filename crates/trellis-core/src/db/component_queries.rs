//! Architecture component storage.

use rusqlite::params;

use crate::{
    architecture::ArchitectureProvider,
    error::{DatabaseResultExt, Result},
    models::Component,
};

const DELETE_COMPONENTS_SQL: &str = "DELETE FROM components WHERE project = ?1";
const INSERT_COMPONENT_SQL: &str = "INSERT INTO components (project, name, component_type, files, dependencies, position) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_COMPONENTS_SQL: &str = "SELECT name, component_type, files, dependencies FROM components WHERE project = ?1 ORDER BY position";

impl super::Database {
    /// Replaces the whole architecture of a project, keeping declaration
    /// order.
    pub fn replace_components(&mut self, project: &str, components: &[Component]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(DELETE_COMPONENTS_SQL, params![project])
            .db_context("Failed to clear components")?;

        for (position, component) in components.iter().enumerate() {
            tx.execute(
                INSERT_COMPONENT_SQL,
                params![
                    project,
                    &component.name,
                    &component.component_type,
                    serde_json::to_string(&component.files)?,
                    serde_json::to_string(&component.dependencies)?,
                    position as i64
                ],
            )
            .db_context("Failed to insert component")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }

    /// Components of a project in declaration order.
    pub fn get_components(&self, project: &str) -> Result<Vec<Component>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_COMPONENTS_SQL)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![project], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .db_context("Failed to query components")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to collect components")?;

        rows.into_iter()
            .map(|(name, component_type, files, dependencies)| -> Result<Component> {
                Ok(Component {
                    name,
                    component_type,
                    files: serde_json::from_str(&files)?,
                    dependencies: serde_json::from_str(&dependencies)?,
                })
            })
            .collect()
    }
}

impl ArchitectureProvider for super::Database {
    fn components(&self, project: &str) -> Result<Vec<Component>> {
        self.get_components(project)
    }
}
