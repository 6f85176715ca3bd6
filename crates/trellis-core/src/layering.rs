//! Phase planning: turns architecture components into dependency-layered
//! phases of tasks.
//!
//! Layering is a batched form of Kahn's algorithm. Each round collects every
//! unplaced component whose in-architecture dependencies were all placed in an
//! earlier round; that set becomes the next phase. When a round finds nothing
//! ready the architecture has a cycle, and the first unplaced component in
//! declaration order is placed on its own so planning always terminates.
//!
//! ```rust
//! use trellis_core::{layering::layer_components, models::Component};
//!
//! let layout = layer_components(
//!     &[
//!         Component::new("db", &[]),
//!         Component::new("api", &["db"]),
//!         Component::new("ui", &["api"]),
//!     ],
//!     true,
//! )
//! .unwrap();
//!
//! assert_eq!(layout.phases.len(), 3);
//! assert_eq!(layout.phases[2].tasks[0].depends_on, vec!["p2t1".to_string()]);
//! assert!(layout.forced.is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{OrchestratorError, Result},
    models::{Component, Phase, PhaseStatus, Task, TaskStatus},
};

/// A dependency the planner could not express as a task edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DroppedDependency {
    pub component: String,
    pub dependency: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Names a component that is not part of the architecture
    Unknown,
    /// Names the component itself
    SelfReference,
    /// Target was not scheduled in an earlier phase (cycle)
    NotEarlier,
}

/// Output of the phase planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseLayout {
    pub phases: Vec<Phase>,
    /// Components placed to break a dependency cycle, in placement order
    pub forced: Vec<String>,
    pub dropped: Vec<DroppedDependency>,
}

/// Layers `components` into phases.
///
/// # Errors
///
/// Returns [`OrchestratorError::InvalidInput`] when `components` is empty or
/// declares the same name twice.
pub fn layer_components(components: &[Component], checkpoints: bool) -> Result<PhaseLayout> {
    if components.is_empty() {
        return Err(OrchestratorError::invalid_input("components")
            .with_reason("a build plan needs at least one component"));
    }

    let mut seen = HashSet::new();
    for component in components {
        if !seen.insert(component.name.as_str()) {
            return Err(OrchestratorError::invalid_input("components")
                .with_reason(format!("duplicate component name '{}'", component.name)));
        }
    }

    let mut dropped = Vec::new();
    let mut internal_deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for component in components {
        let mut deps = Vec::new();
        for dep in &component.dependencies {
            let reason = if dep == &component.name {
                Some(DropReason::SelfReference)
            } else if !seen.contains(dep.as_str()) {
                Some(DropReason::Unknown)
            } else {
                None
            };
            match reason {
                Some(reason) => dropped.push(DroppedDependency {
                    component: component.name.clone(),
                    dependency: dep.clone(),
                    reason,
                }),
                None if !deps.contains(&dep.as_str()) => deps.push(dep.as_str()),
                None => {}
            }
        }
        internal_deps.insert(component.name.as_str(), deps);
    }

    let mut layers: Vec<Vec<&Component>> = Vec::new();
    let mut placed_in: HashMap<&str, usize> = HashMap::new();
    let mut forced = Vec::new();
    let mut remaining: Vec<&Component> = components.iter().collect();

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<&Component>, Vec<&Component>) =
            remaining.into_iter().partition(|component| {
                internal_deps[component.name.as_str()]
                    .iter()
                    .all(|dep| placed_in.contains_key(dep))
            });

        let (layer, rest) = if ready.is_empty() {
            let mut blocked = blocked.into_iter();
            let Some(chosen) = blocked.next() else {
                break;
            };
            warn!(
                "Dependency cycle detected; force-placing component '{}' in phase {}",
                chosen.name,
                layers.len() + 1
            );
            forced.push(chosen.name.clone());
            (vec![chosen], blocked.collect())
        } else {
            (ready, blocked)
        };

        let phase_index = layers.len();
        for component in &layer {
            placed_in.insert(component.name.as_str(), phase_index);
        }
        layers.push(layer);
        remaining = rest;
    }

    let mut task_ids: HashMap<&str, String> = HashMap::new();
    for (phase_index, layer) in layers.iter().enumerate() {
        for (task_index, component) in layer.iter().enumerate() {
            task_ids.insert(
                component.name.as_str(),
                Task::task_id(phase_index + 1, task_index + 1),
            );
        }
    }

    let phases = layers
        .iter()
        .enumerate()
        .map(|(phase_index, layer)| {
            let tasks = layer
                .iter()
                .map(|component| {
                    let mut depends_on = Vec::new();
                    for dep in &internal_deps[component.name.as_str()] {
                        if placed_in[dep] < phase_index {
                            depends_on.push(task_ids[dep].clone());
                        } else {
                            dropped.push(DroppedDependency {
                                component: component.name.clone(),
                                dependency: (*dep).to_string(),
                                reason: DropReason::NotEarlier,
                            });
                        }
                    }
                    build_task(component, task_ids[component.name.as_str()].clone(), depends_on)
                })
                .collect();
            build_phase(phase_index, layer, tasks, checkpoints)
        })
        .collect::<Vec<_>>();

    debug!(
        "Layered {} components into {} phases ({} forced, {} dropped dependencies)",
        components.len(),
        phases.len(),
        forced.len(),
        dropped.len()
    );

    Ok(PhaseLayout {
        phases,
        forced,
        dropped,
    })
}

fn build_task(component: &Component, id: String, depends_on: Vec<String>) -> Task {
    let description = if component.component_type.is_empty() {
        format!("Implement the {} component", component.name)
    } else {
        format!(
            "Implement the {} component ({})",
            component.name, component.component_type
        )
    };

    Task {
        id,
        name: component.name.clone(),
        description,
        component: Some(component.name.clone()),
        depends_on,
        expected_files: component.files.clone(),
        status: TaskStatus::Pending,
        file_changes: Vec::new(),
        started: None,
        completed: None,
        error: None,
    }
}

fn build_phase(phase_index: usize, layer: &[&Component], tasks: Vec<Task>, checkpoint: bool) -> Phase {
    let names = layer
        .iter()
        .map(|component| component.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Phase {
        id: phase_index as u32 + 1,
        name: format!("Phase {}", phase_index + 1),
        description: format!("Build {names}"),
        tasks,
        status: PhaseStatus::Pending,
        checkpoint,
    }
}
