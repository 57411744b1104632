use serde::Serialize;

use crate::model::task::{TaskNode, TaskType};

use super::descendants::descendant_ids;
use super::flatten::FlattenedItem;
use super::projection::{DragState, Projection};

/// Why a drop was refused. All of these leave the store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropRejection {
    /// Hover target or projected parent is gone (or was never hovered)
    TargetLost,
    /// The projected parent is the dragged task or one of its descendants
    Cycle,
    /// The dragged task is not in the section any more
    MissingActive,
}

/// A dragged task changed parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reparent {
    pub task_id: String,
    pub new_parent_id: Option<String>,
}

/// The records a successful drop rewrites
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCommit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reparent: Option<Reparent>,
    /// The destination sibling group in its new order, `sort_order` = index
    pub siblings: Vec<TaskNode>,
}

impl DropCommit {
    /// A new collection with the rewritten sibling records swapped in by id
    pub fn merge_into(&self, tasks: &[TaskNode]) -> Vec<TaskNode> {
        tasks
            .iter()
            .map(|t| {
                self.siblings
                    .iter()
                    .find(|s| s.id == t.id)
                    .unwrap_or(t)
                    .clone()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    Committed(DropCommit),
    /// Valid drop that lands where the task already is
    Unchanged,
    Rejected { reason: DropRejection },
}

impl DropOutcome {
    pub fn rejected(reason: DropRejection) -> Self {
        DropOutcome::Rejected { reason }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, DropOutcome::Committed(_))
    }

    /// Apply to a collection; anything but a commit returns it unchanged
    pub fn apply(&self, tasks: &[TaskNode]) -> Vec<TaskNode> {
        match self {
            DropOutcome::Committed(commit) => commit.merge_into(tasks),
            _ => tasks.to_vec(),
        }
    }
}

/// Resolve a finished drag of `active_id` over `over_id` into the records to
/// rewrite. Pure: `tasks` is only read.
///
/// When the projected parent differs from the current one the task is
/// inserted into the new sibling group right after the hovered row (or at the
/// end when the hovered row is not one of the new siblings). Otherwise the
/// task takes the hovered sibling's slot. In both cases the destination group
/// is renumbered `0..n`; the group the task left keeps its gaps.
pub fn commit_drop(
    tasks: &[TaskNode],
    goal_id: &str,
    task_type: TaskType,
    active_id: &str,
    over_id: &str,
    projection: &Projection,
) -> DropOutcome {
    let new_parent = projection.parent_id.as_deref();

    if new_parent == Some(active_id)
        || new_parent.is_some_and(|p| descendant_ids(tasks, active_id).contains(p))
    {
        tracing::debug!(active_id, parent_id = ?new_parent, "drop rejected: would create a cycle");
        return DropOutcome::rejected(DropRejection::Cycle);
    }

    let Some(active) = tasks
        .iter()
        .find(|t| t.id == active_id && t.in_section(goal_id, task_type))
    else {
        tracing::debug!(active_id, "drop rejected: dragged task is gone");
        return DropOutcome::rejected(DropRejection::MissingActive);
    };

    // Target and parent must still live in the dragged task's section
    let in_section = |id: &str| tasks.iter().any(|t| t.id == id && t.in_section(goal_id, task_type));
    let target_alive = in_section(over_id);
    let parent_alive = new_parent.is_none_or(in_section);
    if !target_alive || !parent_alive {
        tracing::debug!(active_id, over_id, "drop rejected: target is gone");
        return DropOutcome::rejected(DropRejection::TargetLost);
    }

    if active.parent_id.as_deref() != new_parent {
        return reparent(tasks, active, over_id, projection);
    }

    let mut siblings = sibling_group(tasks, goal_id, task_type, new_parent);
    let Some(old_index) = siblings.iter().position(|t| t.id == active_id) else {
        return DropOutcome::rejected(DropRejection::MissingActive);
    };
    let Some(new_index) = siblings.iter().position(|t| t.id == over_id) else {
        // Hovered row belongs to another group at the same projected depth
        return DropOutcome::Unchanged;
    };
    if old_index == new_index {
        return DropOutcome::Unchanged;
    }

    let moved = siblings.remove(old_index);
    siblings.insert(new_index, moved);
    renumber(&mut siblings);
    tracing::debug!(active_id, from = old_index, to = new_index, "reordered within sibling group");

    DropOutcome::Committed(DropCommit {
        reparent: None,
        siblings,
    })
}

fn reparent(tasks: &[TaskNode], active: &TaskNode, over_id: &str, projection: &Projection) -> DropOutcome {
    let new_parent = projection.parent_id.as_deref();
    let mut siblings: Vec<TaskNode> =
        sibling_group(tasks, &active.goal_id, active.task_type, new_parent)
            .into_iter()
            .filter(|t| t.id != active.id)
            .collect();

    let insert_at = siblings
        .iter()
        .position(|t| t.id == over_id)
        .map_or(siblings.len(), |i| i + 1);

    let mut moved = active.clone();
    moved.parent_id = projection.parent_id.clone();
    // One wand per sibling group: the group it joins keeps its own
    if moved.is_magic_wand && siblings.iter().any(|t| t.is_magic_wand) {
        moved.is_magic_wand = false;
    }
    siblings.insert(insert_at, moved);
    renumber(&mut siblings);

    tracing::debug!(
        task_id = %active.id,
        from = ?active.parent_id,
        to = ?projection.parent_id,
        position = insert_at,
        "reparented task"
    );

    DropOutcome::Committed(DropCommit {
        reparent: Some(Reparent {
            task_id: active.id.clone(),
            new_parent_id: projection.parent_id.clone(),
        }),
        siblings,
    })
}

/// One sibling group, cloned and ordered by `sort_order` (stable)
fn sibling_group(
    tasks: &[TaskNode],
    goal_id: &str,
    task_type: TaskType,
    parent_id: Option<&str>,
) -> Vec<TaskNode> {
    let mut group: Vec<TaskNode> = tasks
        .iter()
        .filter(|t| t.in_section(goal_id, task_type) && t.parent_id.as_deref() == parent_id)
        .cloned()
        .collect();
    group.sort_by_key(|t| t.sort_order);
    group
}

fn renumber(group: &mut [TaskNode]) {
    for (i, task) in group.iter_mut().enumerate() {
        task.sort_order = i as i64;
    }
}

impl DragState {
    /// Finish the gesture: project against the rows that were visible and
    /// commit. Consumes the state whatever the outcome.
    pub fn release(
        self,
        items: &[FlattenedItem],
        indent_width: f64,
        tasks: &[TaskNode],
        goal_id: &str,
        task_type: TaskType,
    ) -> DropOutcome {
        let Some(over_id) = self.over_id.as_deref() else {
            return DropOutcome::rejected(DropRejection::TargetLost);
        };
        let Some(projection) = self.projection(items, indent_width) else {
            return DropOutcome::rejected(DropRejection::TargetLost);
        };
        commit_drop(tasks, goal_id, task_type, &self.active_id, over_id, &projection)
    }
}
