//! One-line confirmations for operations whose result is a list.

use std::fmt;

use crate::lifecycle::RollbackReport;

/// A success or warning line printed ahead of a larger result.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
        }
    }

    /// Summarizes the file side of a rollback.
    ///
    /// A rollback whose status change was saved but left files needing
    /// attention is reported as a failure so callers notice.
    pub fn for_rollback(report: &RollbackReport) -> Self {
        let problems = report.problems().count();
        if problems == 0 {
            Self::success(format!(
                "Rolled back task {} ({} file(s) reverted)",
                report.effects.task_id,
                report.files.iter().filter(|f| f.result.is_success()).count()
            ))
        } else {
            Self::failure(format!(
                "Rolled back task {} but {problems} file(s) need manual attention",
                report.effects.task_id
            ))
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            if self.success { "Success:" } else { "Warning:" },
            self.message
        )
    }
}
