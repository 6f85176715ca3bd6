//! Display implementations for domain models.
//!
//! All output is markdown so the same text renders in the terminal and reads
//! well as an MCP tool response.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

use crate::models::{
    BuildPlan, Component, FileAction, FileChange, Phase, PhaseStatus, PlanStatus, PlanSummary,
    Progress, StepOutcome, Task, TaskStatus,
};

/// Task and plan times in the system timezone, e.g. `2024-05-01 14:03:09 CEST`.
struct Local<'a>(&'a Timestamp);

impl fmt::Display for Local<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zoned = self.0.to_zoned(TimeZone::system());
        write!(f, "{}", zoned.strftime("%Y-%m-%d %H:%M:%S %Z"))
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", TaskStatus::from(*self).as_str())
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` ({})", self.path, self.action)?;
        if !self.is_reversible() {
            write!(f, " [irreversible]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} tasks completed", self.completed, self.total)?;

        let mut details = Vec::new();
        if self.in_progress > 0 {
            details.push(format!("{} in progress", self.in_progress));
        }
        if self.failed > 0 {
            details.push(format!("{} failed", self.failed));
        }
        if self.rolled_back > 0 {
            details.push(format!("{} rolled back", self.rolled_back));
        }
        if !details.is_empty() {
            write!(f, " ({})", details.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- **{}**", self.name)?;
        if !self.component_type.is_empty() {
            write!(f, " ({})", self.component_type)?;
        }
        if !self.dependencies.is_empty() {
            write!(f, " depends on {}", self.dependencies.join(", "))?;
        }
        writeln!(f)?;
        for pattern in &self.files {
            writeln!(f, "  - `{pattern}`")?;
        }
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id,
            self.name,
            self.status.with_icon()
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f)?;

        if !self.depends_on.is_empty() {
            writeln!(f, "- Depends on: {}", self.depends_on.join(", "))?;
        }
        if let Some(started) = &self.started {
            writeln!(f, "- Started: {}", Local(started))?;
        }
        if let Some(completed) = &self.completed {
            writeln!(f, "- Finished: {}", Local(completed))?;
        }
        if !self.depends_on.is_empty() || self.started.is_some() || self.completed.is_some() {
            writeln!(f)?;
        }

        if let Some(error) = &self.error {
            writeln!(f, "#### Error")?;
            writeln!(f)?;
            writeln!(f, "{error}")?;
            writeln!(f)?;
        }

        if !self.file_changes.is_empty() {
            writeln!(f, "#### Files")?;
            writeln!(f)?;
            for change in &self.file_changes {
                writeln!(f, "- {change}")?;
            }
            writeln!(f)?;
        } else if !self.expected_files.is_empty() && self.status == TaskStatus::Pending {
            writeln!(f, "#### Expected Files")?;
            writeln!(f)?;
            for pattern in &self.expected_files {
                writeln!(f, "- `{pattern}`")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = if self.checkpoint { " [checkpoint]" } else { "" };
        writeln!(
            f,
            "## {} ({}){gate}",
            self.name,
            self.derived_status()
        )?;
        writeln!(f)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
            writeln!(f)?;
        }
        for task in &self.tasks {
            write!(f, "{task}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. Build plan for {}", self.id, self.project)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        writeln!(
            f,
            "- Current phase: {} of {}",
            self.current_phase + 1,
            self.phases.len()
        )?;
        writeln!(f, "- Progress: {}", self.progress())?;
        writeln!(f, "- Session: {}", self.session_id)?;
        writeln!(f, "- Created: {}", Local(&self.created_at))?;
        writeln!(f, "- Updated: {}", Local(&self.updated_at))?;

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        if self.phases.is_empty() {
            writeln!(f, "\nNo phases in this plan.")?;
            return Ok(());
        }

        writeln!(f)?;
        for phase in &self.phases {
            write!(f, "{phase}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = if self.progress.total > 0 {
            format!(" ({}/{})", self.progress.completed, self.progress.total)
        } else {
            String::new()
        };

        writeln!(f, "## {} (ID: {}){progress}", self.project, self.id)?;
        writeln!(f)?;

        if !self.description.is_empty() {
            writeln!(f, "- **Description**: {}", self.description)?;
        }
        writeln!(f, "- **Status**: {}", self.status)?;
        writeln!(
            f,
            "- **Phases**: {}/{} completed, current {}",
            self.completed_phases,
            self.total_phases,
            self.current_phase + 1
        )?;
        writeln!(f, "- **Tasks**: {}", self.progress)?;
        writeln!(f, "- **Updated**: {}", Local(&self.updated_at))?;
        writeln!(f)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chain_plan, ts};

    #[test]
    fn test_task_times_render_in_local_time() {
        let mut plan = chain_plan();
        let task = &mut plan.phases[0].tasks[0];
        task.status = TaskStatus::InProgress;
        task.started = Some(ts(1_700_000_000));

        let expected = ts(1_700_000_000)
            .to_zoned(TimeZone::system())
            .strftime("%Y-%m-%d %H:%M:%S")
            .to_string();
        let output = task.to_string();

        let line = output
            .lines()
            .find(|line| line.starts_with("- Started: "))
            .expect("started line");
        assert!(line.contains(&expected), "{line}");
        assert!(!output.contains("- Finished:"));
    }

    #[test]
    fn test_summary_shows_updated_time() {
        let plan = chain_plan();
        let output = PlanSummary::from(&plan).to_string();
        assert!(output.contains(&format!("- **Updated**: {}", Local(&plan.updated_at))));
    }
}
