//! Filesystem seam used by the rollback engine.

use std::{
    env::current_dir,
    fs, io,
    path::{Component as PathComponent, Path, PathBuf},
};

use crate::error::{OrchestratorError, Result};

/// File operations the rollback engine needs.
pub trait Filesystem: Send + Sync {
    /// Deletes a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Writes `contents` to `path`, creating parent directories as needed.
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Reads a file to a string.
    fn read_file(&self, path: &Path) -> io::Result<String>;
}

/// [`Filesystem`] backed by the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Makes a project root absolute, resolving relative roots against the
/// current working directory.
pub fn resolve_project_root(root: &str) -> Result<PathBuf> {
    let path = Path::new(root);
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }

    let cwd = current_dir().map_err(|_| {
        OrchestratorError::invalid_input("project_root_path")
            .with_reason("Cannot resolve current working directory to make path absolute")
    })?;
    Ok(normalize_path(&cwd.join(path)))
}

/// Joins a ledger path onto the project root.
///
/// Returns `None` for absolute paths and for paths that climb out of the
/// root through `..`.
pub fn join_within_root(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    if relative.is_absolute() || relative.as_os_str().is_empty() {
        return None;
    }

    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            PathComponent::Normal(_) => depth += 1,
            PathComponent::CurDir => {}
            PathComponent::ParentDir => depth = depth.checked_sub(1)?,
            PathComponent::RootDir | PathComponent::Prefix(_) => return None,
        }
    }

    Some(normalize_path(&root.join(relative)))
}

/// Normalizes a path by resolving "." and ".." components without requiring
/// the path to exist
fn normalize_path(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut acc, component| match component {
            PathComponent::CurDir => acc,
            PathComponent::ParentDir => {
                acc.pop();
                acc
            }
            _ => {
                acc.push(component);
                acc
            }
        })
}
