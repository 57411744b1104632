use chrono::Utc;
use serde::Serialize;

use crate::model::goal::Goal;
use crate::model::ledger::Ledger;
use crate::model::task::TaskType;

use super::task_ops::next_id;

#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("goal not found: {0}")]
    NotFound(String),
    #[error("goal title cannot be empty")]
    EmptyTitle,
    #[error("budget must be a non-negative number, got {0}")]
    InvalidBudget(f64),
}

/// Add a goal. Returns the assigned ID.
pub fn add_goal(ledger: &mut Ledger, title: &str, deadline: Option<&str>) -> Result<String, GoalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(GoalError::EmptyTitle);
    }
    let id = next_id(ledger.goals.iter().map(|g| g.id.as_str()), "G");
    let mut goal = Goal::new(id.clone(), title);
    goal.deadline = deadline.unwrap_or_default().to_string();
    goal.created_at = Utc::now().to_rfc3339();
    ledger.goals.push(goal);
    Ok(id)
}

pub fn set_goal_completed(ledger: &mut Ledger, goal_id: &str, completed: bool) -> Result<(), GoalError> {
    let goal = ledger
        .goal_mut(goal_id)
        .ok_or_else(|| GoalError::NotFound(goal_id.to_string()))?;
    goal.completed = completed;
    Ok(())
}

/// Delete a goal and every task of its three sections. Returns the number of
/// tasks removed.
pub fn delete_goal(ledger: &mut Ledger, goal_id: &str) -> Result<usize, GoalError> {
    if ledger.goal(goal_id).is_none() {
        return Err(GoalError::NotFound(goal_id.to_string()));
    }
    ledger.goals.retain(|g| g.id != goal_id);
    let before = ledger.tasks.len();
    ledger.tasks.retain(|t| t.goal_id != goal_id);
    let removed = before - ledger.tasks.len();
    tracing::debug!(goal_id, removed, "deleted goal");
    Ok(removed)
}

/// Toggle the goal wand. Only one goal in the whole ledger carries it.
/// Returns the goal's new flag.
pub fn toggle_goal_wand(ledger: &mut Ledger, goal_id: &str) -> Result<bool, GoalError> {
    let setting = !ledger
        .goal(goal_id)
        .ok_or_else(|| GoalError::NotFound(goal_id.to_string()))?
        .is_magic_wand;
    for goal in &mut ledger.goals {
        if goal.id == goal_id {
            goal.is_magic_wand = setting;
        } else if setting {
            goal.is_magic_wand = false;
        }
    }
    Ok(setting)
}

/// Earmark savings for a goal; `None` clears the allocation.
pub fn set_goal_budget(ledger: &mut Ledger, goal_id: &str, budget: Option<f64>) -> Result<(), GoalError> {
    if let Some(amount) = budget
        && !(amount.is_finite() && amount >= 0.0)
    {
        return Err(GoalError::InvalidBudget(amount));
    }
    let goal = ledger
        .goal_mut(goal_id)
        .ok_or_else(|| GoalError::NotFound(goal_id.to_string()))?;
    goal.budget = budget;
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Wand holder shown as a section banner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWand {
    pub task_type: TaskType,
    pub label: &'static str,
    pub task_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub is_magic_wand: bool,
    /// Cost over all three sections
    pub total_cost: f64,
    /// Counts over pre and post tasks only; dreams are never done
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub wands: Vec<SectionWand>,
}

pub fn goal_summary(ledger: &Ledger, goal: &Goal) -> GoalSummary {
    let tasks: Vec<_> = ledger.tasks.iter().filter(|t| t.goal_id == goal.id).collect();
    let total_cost: f64 = tasks.iter().map(|t| t.cost).sum();
    let countable: Vec<_> = tasks.iter().filter(|t| t.task_type.is_completable()).collect();
    let completed_tasks = countable.iter().filter(|t| t.completed).count();

    let wands = TaskType::ALL
        .iter()
        .filter_map(|&task_type| {
            let wand = tasks
                .iter()
                .find(|t| t.task_type == task_type && t.is_magic_wand && t.parent_id.is_none())
                .or_else(|| tasks.iter().find(|t| t.task_type == task_type && t.is_magic_wand))?;
            Some(SectionWand {
                task_type,
                label: task_type.wand_label(),
                task_id: wand.id.clone(),
                title: wand.title.clone(),
            })
        })
        .collect();

    GoalSummary {
        id: goal.id.clone(),
        title: goal.title.clone(),
        completed: goal.completed,
        is_magic_wand: goal.is_magic_wand,
        total_cost,
        completed_tasks,
        total_tasks: countable.len(),
        wands,
    }
}

/// Summaries for every goal, in ledger order
pub fn goal_summaries(ledger: &Ledger) -> Vec<GoalSummary> {
    ledger.goals.iter().map(|g| goal_summary(ledger, g)).collect()
}
