//! Build plan storage and queries.

use jiff::Timestamp;
use log::debug;
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, OrchestratorError, Result},
    models::{BuildPlan, Phase, PlanStatus},
};

const PLAN_COLUMNS: &str =
    "id, project, description, status, current_phase, phases, session_id, version, created_at, updated_at";

const INSERT_PLAN_SQL: &str = "INSERT INTO build_plans (project, description, status, current_phase, phases, session_id, version, created_at, updated_at) VALUES (?1, ?2, ?3, 0, ?4, ?5, 1, ?6, ?6)";
const SUPERSEDE_PLAN_SQL: &str =
    "UPDATE build_plans SET superseded = 1, updated_at = ?2 WHERE id = ?1 AND superseded = 0";
const UPDATE_PLAN_SQL: &str = "UPDATE build_plans SET status = ?1, current_phase = ?2, phases = ?3, session_id = ?4, version = version + 1, updated_at = ?5 WHERE id = ?6 AND version = ?7";
const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM build_plans WHERE id = ?1)";

/// Wraps a parse failure of column `index` as a rusqlite conversion error.
fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<BuildPlan> {
    let status_str: String = row.get(3)?;
    let status = status_str.parse::<PlanStatus>().map_err(|_| {
        conversion_error(
            3,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid plan status: {status_str}"),
            ),
        )
    })?;

    let phases: Vec<Phase> = serde_json::from_str(&row.get::<_, String>(5)?)
        .map_err(|e| conversion_error(5, e))?;

    let mut plan = BuildPlan {
        id: row.get::<_, i64>(0)? as u64,
        project: row.get(1)?,
        description: row.get(2)?,
        status,
        current_phase: row.get::<_, i64>(4)? as usize,
        phases,
        session_id: row.get(6)?,
        version: row.get::<_, i64>(7)? as u64,
        created_at: row
            .get::<_, String>(8)?
            .parse::<Timestamp>()
            .map_err(|e| conversion_error(8, e))?,
        updated_at: row
            .get::<_, String>(9)?
            .parse::<Timestamp>()
            .map_err(|e| conversion_error(9, e))?,
    };
    // Stored phase statuses are never trusted.
    plan.recompute_phase_statuses();
    Ok(plan)
}

impl super::Database {
    /// Stores a freshly planned build.
    ///
    /// When `supersede` names an existing plan it is marked superseded in the
    /// same transaction, so the project never has two current plans.
    pub fn insert_plan(
        &mut self,
        project: &str,
        description: &str,
        phases: &[Phase],
        session_id: &str,
        supersede: Option<u64>,
    ) -> Result<BuildPlan> {
        let phases_json = serde_json::to_string(phases)?;
        let now = Timestamp::now();
        let now_str = now.to_string();

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        if let Some(old_id) = supersede {
            tx.execute(SUPERSEDE_PLAN_SQL, params![old_id as i64, &now_str])
                .db_context("Failed to supersede build plan")?;
        }

        tx.execute(
            INSERT_PLAN_SQL,
            params![
                project,
                description,
                PlanStatus::Planning.as_str(),
                phases_json,
                session_id,
                &now_str
            ],
        )
        .db_context("Failed to insert build plan")?;

        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Inserted build plan {id} for project {project}");

        let mut plan = BuildPlan {
            id,
            project: project.to_string(),
            description: description.to_string(),
            status: PlanStatus::Planning,
            current_phase: 0,
            phases: phases.to_vec(),
            session_id: session_id.to_string(),
            version: 1,
            created_at: now,
            updated_at: now,
        };
        plan.recompute_phase_statuses();
        Ok(plan)
    }

    /// Retrieves a build plan by its ID, superseded or not.
    pub fn get_plan(&self, id: u64) -> Result<Option<BuildPlan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM build_plans WHERE id = ?1");
        self.connection
            .query_row(&sql, params![id as i64], plan_from_row)
            .optional()
            .db_context("Failed to query build plan")
    }

    /// Latest plan of the project that has not been superseded. It may be
    /// completed.
    pub fn get_current_plan(&self, project: &str) -> Result<Option<BuildPlan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM build_plans WHERE project = ?1 AND superseded = 0 ORDER BY id DESC LIMIT 1"
        );
        self.connection
            .query_row(&sql, params![project], plan_from_row)
            .optional()
            .db_context("Failed to query current build plan")
    }

    /// Current plans of every project, most recently updated first.
    pub fn list_plans(&self, include_completed: bool) -> Result<Vec<BuildPlan>> {
        let mut query = format!("SELECT {PLAN_COLUMNS} FROM build_plans WHERE superseded = 0");
        if !include_completed {
            query.push_str(" AND status != 'completed'");
        }
        query.push_str(" ORDER BY updated_at DESC, id DESC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let plans = stmt
            .query_map([], plan_from_row)
            .db_context("Failed to query build plans")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to collect build plans")?;

        Ok(plans)
    }

    /// Writes the mutable fields of `plan` if nobody else wrote since it was
    /// read, and returns the stored copy with its bumped version.
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::VersionConflict`] when the stored version differs
    /// from `plan.version`; [`OrchestratorError::PlanNotFound`] when the row is
    /// gone.
    pub fn update_plan(&mut self, plan: &BuildPlan) -> Result<BuildPlan> {
        let phases_json = serde_json::to_string(&plan.phases)?;
        let now = Timestamp::now();

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let updated = tx
            .execute(
                UPDATE_PLAN_SQL,
                params![
                    plan.status.as_str(),
                    plan.current_phase as i64,
                    phases_json,
                    &plan.session_id,
                    now.to_string(),
                    plan.id as i64,
                    plan.version as i64
                ],
            )
            .db_context("Failed to update build plan")?;

        if updated == 0 {
            let exists: bool = tx
                .query_row(CHECK_PLAN_EXISTS_SQL, params![plan.id as i64], |row| {
                    row.get(0)
                })
                .db_context("Failed to check build plan existence")?;
            return Err(if exists {
                OrchestratorError::VersionConflict {
                    plan_id: plan.id,
                    expected: plan.version,
                }
            } else {
                OrchestratorError::PlanNotFound { id: plan.id }
            });
        }

        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Stored build plan {} at version {}", plan.id, plan.version + 1);

        let mut stored = plan.clone();
        stored.version += 1;
        stored.updated_at = now;
        Ok(stored)
    }
}
