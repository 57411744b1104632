use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;

use crate::model::config::TreeConfig;
use crate::model::ledger::Ledger;
use crate::model::task::{NewTask, TaskNode, TaskPatch, TaskType};
use crate::tree::{DragState, DropOutcome, DropRejection, Projection, TaskTree, descendant_ids};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("goal not found: {0}")]
    GoalNotFound(String),
    #[error("parent {parent_id} is not a {task_type} task of goal {goal_id}")]
    ParentMismatch {
        parent_id: String,
        goal_id: String,
        task_type: TaskType,
    },
    #[error("cannot move {task_id} under its own subtree ({parent_id})")]
    Cycle { task_id: String, parent_id: String },
    #[error("dream {0} cannot be completed")]
    NotCompletable(String),
    #[error("cost must be a non-negative number, got {0}")]
    InvalidCost(f64),
    #[error("title cannot be empty")]
    EmptyTitle,
}

// ---------------------------------------------------------------------------
// Create / update / delete
// ---------------------------------------------------------------------------

/// Add a task to a goal's section, optionally under `parent_id`.
/// The task goes to the end of its sibling group. Returns the assigned ID.
pub fn add_task(
    ledger: &mut Ledger,
    goal_id: &str,
    parent_id: Option<&str>,
    task_type: TaskType,
    new: NewTask,
) -> Result<String, TaskError> {
    if ledger.goal(goal_id).is_none() {
        return Err(TaskError::GoalNotFound(goal_id.to_string()));
    }
    let title = new.title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    check_cost(new.cost)?;
    if let Some(parent_id) = parent_id {
        check_parent(ledger, parent_id, goal_id, task_type)?;
    }

    let id = next_id(ledger.tasks.iter().map(|t| t.id.as_str()), "T");
    let sort_order = next_sort_order(&ledger.tasks, goal_id, task_type, parent_id);
    let mut task = TaskNode::new(
        id.clone(),
        goal_id,
        parent_id.map(String::from),
        task_type,
        sort_order,
        title,
    );
    task.cost = new.cost;
    task.time_cost = new.time_cost;
    task.deadline = new.deadline;
    task.created_at = Utc::now().to_rfc3339();
    ledger.tasks.push(task);
    Ok(id)
}

/// Apply a partial update to a task's leaf attributes.
pub fn update_task(ledger: &mut Ledger, task_id: &str, patch: TaskPatch) -> Result<(), TaskError> {
    if let Some(cost) = patch.cost {
        check_cost(cost)?;
    }
    if let Some(title) = &patch.title
        && title.trim().is_empty()
    {
        return Err(TaskError::EmptyTitle);
    }
    let task = ledger
        .task_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if let Some(title) = patch.title {
        task.title = title.trim().to_string();
    }
    if let Some(cost) = patch.cost {
        task.cost = cost;
    }
    if let Some(time_cost) = patch.time_cost {
        task.time_cost = time_cost;
    }
    if let Some(deadline) = patch.deadline {
        task.deadline = deadline;
    }
    if let Some(link) = patch.linked_expense_id {
        task.linked_expense_id = link;
    }
    Ok(())
}

/// Mark a task done or not done. Dreams have no completion state.
pub fn set_completed(ledger: &mut Ledger, task_id: &str, completed: bool) -> Result<(), TaskError> {
    let task = ledger
        .task_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if !task.task_type.is_completable() {
        return Err(TaskError::NotCompletable(task_id.to_string()));
    }
    task.completed = completed;
    Ok(())
}

/// Delete a task together with its whole subtree. Returns the removed IDs,
/// the task itself first.
pub fn delete_task(ledger: &mut Ledger, task_id: &str) -> Result<Vec<String>, TaskError> {
    if ledger.task(task_id).is_none() {
        return Err(TaskError::NotFound(task_id.to_string()));
    }
    let mut removed = vec![task_id.to_string()];
    removed.extend(descendant_ids(&ledger.tasks, task_id));
    let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();
    ledger.tasks.retain(|t| !doomed.contains(t.id.as_str()));
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Magic wand
// ---------------------------------------------------------------------------

/// Toggle the wand on `task_id`. Setting it clears the flag on every sibling
/// in the same group. Returns the new collection, or `None` if the task
/// does not exist.
pub fn toggle_magic_wand(tasks: &[TaskNode], task_id: &str) -> Option<Vec<TaskNode>> {
    let target = tasks.iter().find(|t| t.id == task_id)?;
    let setting = !target.is_magic_wand;
    Some(
        tasks
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if t.id == task_id {
                    t.is_magic_wand = setting;
                } else if setting && t.is_sibling_of(target) {
                    t.is_magic_wand = false;
                }
                t
            })
            .collect(),
    )
}

/// Toggle the wand in place. Returns the task's new flag.
pub fn toggle_wand(ledger: &mut Ledger, task_id: &str) -> Result<bool, TaskError> {
    let tasks = toggle_magic_wand(&ledger.tasks, task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    ledger.tasks = tasks;
    Ok(ledger.task(task_id).is_some_and(|t| t.is_magic_wand))
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// Move a task under `new_parent` (or to the roots), at the end of the new
/// sibling group. Moving to the current parent is a no-op.
pub fn move_task(ledger: &mut Ledger, task_id: &str, new_parent: Option<&str>) -> Result<(), TaskError> {
    let task = ledger
        .task(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if task.parent_id.as_deref() == new_parent {
        return Ok(());
    }
    let (goal_id, task_type) = (task.goal_id.clone(), task.task_type);

    if let Some(parent_id) = new_parent {
        if parent_id == task_id || descendant_ids(&ledger.tasks, task_id).contains(parent_id) {
            return Err(TaskError::Cycle {
                task_id: task_id.to_string(),
                parent_id: parent_id.to_string(),
            });
        }
        check_parent(ledger, parent_id, &goal_id, task_type)?;
    }

    let sort_order = next_sort_order(&ledger.tasks, &goal_id, task_type, new_parent);
    let wand_taken = ledger.tasks.iter().any(|t| {
        t.id != task_id
            && t.is_magic_wand
            && t.in_section(&goal_id, task_type)
            && t.parent_id.as_deref() == new_parent
    });
    let Some(task) = ledger.task_mut(task_id) else {
        return Err(TaskError::NotFound(task_id.to_string()));
    };
    task.parent_id = new_parent.map(String::from);
    task.sort_order = sort_order;
    if wand_taken {
        task.is_magic_wand = false;
    }
    tracing::debug!(task_id, parent_id = ?new_parent, "moved task");
    Ok(())
}

/// Result of a drag issued against the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropReport {
    /// `None` when the dragged or hovered row was not visible
    pub projection: Option<Projection>,
    pub outcome: DropOutcome,
}

/// A complete drag gesture replayed in one go
#[derive(Debug, Clone, Copy)]
pub struct DropRequest<'a> {
    pub goal_id: &'a str,
    pub task_type: TaskType,
    pub active_id: &'a str,
    pub over_id: &'a str,
    /// Total horizontal pointer travel in pixels
    pub offset_x: f64,
}

/// Replay a drag and drop it, using the rows visible under `collapsed`.
/// Commits into the ledger when the drop is valid; otherwise the ledger is
/// untouched.
pub fn apply_drop(
    ledger: &mut Ledger,
    request: DropRequest<'_>,
    collapsed: &HashSet<String>,
    tree_config: &TreeConfig,
) -> DropReport {
    let DropRequest {
        goal_id,
        task_type,
        active_id,
        over_id,
        offset_x,
    } = request;
    let tree = TaskTree::with_policy(&ledger.tasks, goal_id, task_type, tree_config.orphans);
    let visible = tree.visible(collapsed);
    let indent = f64::from(tree_config.indent_width);

    let mut drag = DragState::start(active_id);
    drag.hover(over_id);
    drag.move_to(offset_x);

    // Rows hidden under a collapsed parent cannot take part in a gesture
    if !visible.iter().any(|i| i.id == active_id) || !visible.iter().any(|i| i.id == over_id) {
        let reason = if ledger.task(active_id).is_none() {
            DropRejection::MissingActive
        } else {
            DropRejection::TargetLost
        };
        tracing::debug!(active_id, over_id, ?reason, "drop rows not visible");
        return DropReport {
            projection: None,
            outcome: DropOutcome::rejected(reason),
        };
    }

    let projection = drag.projection(&visible, indent);
    let outcome = drag.release(&visible, indent, &ledger.tasks, goal_id, task_type);
    if let DropOutcome::Committed(commit) = &outcome {
        ledger.tasks = commit.merge_into(&ledger.tasks);
    } else {
        tracing::debug!(active_id, over_id, ?outcome, "drop left the ledger unchanged");
    }
    DropReport { projection, outcome }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_cost(cost: f64) -> Result<(), TaskError> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(())
    } else {
        Err(TaskError::InvalidCost(cost))
    }
}

fn check_parent(
    ledger: &Ledger,
    parent_id: &str,
    goal_id: &str,
    task_type: TaskType,
) -> Result<(), TaskError> {
    let parent = ledger
        .task(parent_id)
        .ok_or_else(|| TaskError::NotFound(parent_id.to_string()))?;
    if !parent.in_section(goal_id, task_type) {
        return Err(TaskError::ParentMismatch {
            parent_id: parent_id.to_string(),
            goal_id: goal_id.to_string(),
            task_type,
        });
    }
    Ok(())
}

/// One past the highest `sort_order` in the sibling group, 0 when empty
fn next_sort_order(
    tasks: &[TaskNode],
    goal_id: &str,
    task_type: TaskType,
    parent_id: Option<&str>,
) -> i64 {
    tasks
        .iter()
        .filter(|t| t.in_section(goal_id, task_type) && t.parent_id.as_deref() == parent_id)
        .map(|t| t.sort_order + 1)
        .max()
        .unwrap_or(0)
}

/// Next sequential ID of the form `PREFIX-NNN`, one past the highest in use.
pub fn next_id<'a>(existing: impl Iterator<Item = &'a str>, prefix: &str) -> String {
    let prefix_dash = format!("{}-", prefix);
    let max = existing
        .filter_map(|id| id.strip_prefix(&prefix_dash))
        .filter_map(|num| num.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    format!("{}-{:03}", prefix, max + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
