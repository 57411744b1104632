use serde::{Deserialize, Serialize};

use super::expense::{Expense, FixedExpense};
use super::goal::Goal;
use super::task::{TaskNode, TaskType};

/// The authoritative flat store. Every view (trees, totals, checks) is
/// derived from these vectors and the store is replaced wholesale on commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedExpense>,
}

impl Ledger {
    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == goal_id)
    }

    pub fn goal_mut(&mut self, goal_id: &str) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == goal_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskNode> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut TaskNode> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn expense(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }

    /// Tasks of one goal/type partition, in collection order
    pub fn section_tasks<'a>(
        &'a self,
        goal_id: &'a str,
        task_type: TaskType,
    ) -> impl Iterator<Item = &'a TaskNode> + 'a {
        self.tasks
            .iter()
            .filter(move |t| t.in_section(goal_id, task_type))
    }
}
