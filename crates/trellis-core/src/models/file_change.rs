//! File-change ledger entries recorded against tasks.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What a task did to a file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Created,
    Modified,
    Deleted,
}

impl FileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileAction::Created => "created",
            FileAction::Modified => "modified",
            FileAction::Deleted => "deleted",
        }
    }
}

impl FromStr for FileAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(FileAction::Created),
            "modified" => Ok(FileAction::Modified),
            "deleted" => Ok(FileAction::Deleted),
            _ => Err(format!("Invalid file action: {s}")),
        }
    }
}

/// A single file effect reported by an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FileChange {
    /// Path relative to the project's code root
    pub path: String,

    /// What happened to the file
    pub action: FileAction,

    /// Content before the change; needed to reverse `modified` and `deleted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_content: Option<String>,
}

impl FileChange {
    pub fn created(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action: FileAction::Created,
            previous_content: None,
        }
    }

    pub fn modified(path: impl Into<String>, previous_content: Option<String>) -> Self {
        Self {
            path: path.into(),
            action: FileAction::Modified,
            previous_content,
        }
    }

    pub fn deleted(path: impl Into<String>, previous_content: Option<String>) -> Self {
        Self {
            path: path.into(),
            action: FileAction::Deleted,
            previous_content,
        }
    }

    /// Whether the rollback engine can undo this change on its own.
    pub fn is_reversible(&self) -> bool {
        match self.action {
            FileAction::Created => true,
            FileAction::Modified | FileAction::Deleted => self.previous_content.is_some(),
        }
    }
}
