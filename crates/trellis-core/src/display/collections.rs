//! Collection wrapper types for displaying groups of domain objects.
//!
//! This module provides wrapper types that format collections of domain objects
//! with consistent structure and empty collection handling.

use std::{fmt, ops::Index};

use crate::models::{Component, PlanSummary};

/// Newtype wrapper for displaying collections of plan summaries.
///
/// Handles empty collections gracefully and leaves titles to the caller.
///
/// # Examples
///
/// ```rust
/// use trellis_core::{
///     display::PlanSummaries,
///     models::{PlanStatus, PlanSummary, Progress},
/// };
/// use jiff::Timestamp;
///
/// let summary = PlanSummary {
///     id: 1,
///     project: "shop".to_string(),
///     description: "Storefront MVP".to_string(),
///     status: PlanStatus::InProgress,
///     current_phase: 0,
///     total_phases: 3,
///     completed_phases: 1,
///     progress: Progress::default(),
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let output = format!("{}", PlanSummaries(vec![summary]));
/// assert!(output.contains("## shop (ID: 1)"));
/// ```
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of plan summaries in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get an iterator over the plan summaries.
    pub fn iter(&self) -> std::slice::Iter<'_, PlanSummary> {
        self.0.iter()
    }
}

impl Index<usize> for PlanSummaries {
    type Output = PlanSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a PlanSummaries {
    type Item = &'a PlanSummary;
    type IntoIter = std::slice::Iter<'a, PlanSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No build plans found.")
        } else {
            for plan in &self.0 {
                write!(f, "{plan}")?;
            }
            Ok(())
        }
    }
}

/// Newtype wrapper for displaying a project's architecture.
pub struct Components(pub Vec<Component>);

impl Components {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.0.iter()
    }
}

impl fmt::Display for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No components defined.")
        } else {
            for component in &self.0 {
                write!(f, "{component}")?;
            }
            Ok(())
        }
    }
}
