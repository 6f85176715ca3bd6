//! Builder for creating and configuring Orchestrator instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::task;

use super::Orchestrator;
use crate::{
    db::Database,
    error::{OrchestratorError, Result},
    fs::{Filesystem, LocalFilesystem},
};

/// Builder for creating and configuring Orchestrator instances.
#[derive(Clone)]
pub struct OrchestratorBuilder {
    database_path: Option<PathBuf>,
    filesystem: Option<Arc<dyn Filesystem>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            filesystem: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/trellis/trellis.db` or
    /// `~/.local/share/trellis/trellis.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the filesystem rollback reverts files through. Defaults to
    /// [`LocalFilesystem`].
    pub fn with_filesystem(mut self, filesystem: Arc<dyn Filesystem>) -> Self {
        self.filesystem = Some(filesystem);
        self
    }

    /// Builds the configured orchestrator instance.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::FileSystem` if the database directory
    /// cannot be created
    /// Returns `OrchestratorError::Database` if database initialization fails
    pub async fn build(self) -> Result<Orchestrator> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| OrchestratorError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), OrchestratorError>(())
        })
        .await
        .map_err(OrchestratorError::join_error)??;

        let filesystem = self
            .filesystem
            .unwrap_or_else(|| Arc::new(LocalFilesystem));
        Ok(Orchestrator::new(db_path, filesystem))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("trellis")
            .place_data_file("trellis.db")
            .map_err(|e| OrchestratorError::XdgDirectory(e.to_string()))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
