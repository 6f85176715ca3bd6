//! Database operations and SQLite management for build plans and
//! architectures.
//!
//! A build plan is one row whose `phases` column holds the whole phase/task
//! tree as JSON. Writes are compare-and-swap on the `version` column, so a
//! writer holding a stale copy gets
//! [`crate::error::OrchestratorError::VersionConflict`] instead of silently
//! overwriting someone else's update.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod component_queries;
pub mod migrations;
pub mod plan_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
