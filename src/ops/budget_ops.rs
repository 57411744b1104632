use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;

use crate::model::expense::{Expense, ExpenseCategory, FixedExpense, FixedExpenseCategory, Frequency};
use crate::model::ledger::Ledger;

use super::task_ops::next_id;

#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("description cannot be empty")]
    EmptyDescription,
    #[error("goal not found: {0}")]
    GoalNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("custom frequency needs a positive day count")]
    MissingCustomDays,
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    /// `YYYY-MM-DD`; today when absent
    pub date: Option<String>,
    pub time_cost: String,
    pub linked_goal_id: Option<String>,
    pub linked_task_id: Option<String>,
}

/// Record a one-off expense. Linking a task also links the task back to the
/// expense and copies the task's goal and type onto the record.
pub fn add_expense(ledger: &mut Ledger, new: NewExpense) -> Result<String, BudgetError> {
    check_amount(new.amount)?;
    let description = new.description.trim();
    if description.is_empty() {
        return Err(BudgetError::EmptyDescription);
    }
    let date = match new.date {
        Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| BudgetError::InvalidDate(date.clone()))?,
        None => Local::now().date_naive(),
    };

    let mut linked_goal_id = new.linked_goal_id;
    let mut linked_task_type = None;
    if let Some(task_id) = &new.linked_task_id {
        let task = ledger
            .task(task_id)
            .ok_or_else(|| BudgetError::TaskNotFound(task_id.clone()))?;
        linked_goal_id = Some(task.goal_id.clone());
        linked_task_type = Some(task.task_type);
    }
    if let Some(goal_id) = &linked_goal_id
        && ledger.goal(goal_id).is_none()
    {
        return Err(BudgetError::GoalNotFound(goal_id.clone()));
    }

    let id = next_id(ledger.expenses.iter().map(|e| e.id.as_str()), "E");
    if let Some(task_id) = &new.linked_task_id
        && let Some(task) = ledger.task_mut(task_id)
    {
        task.linked_expense_id = Some(id.clone());
    }
    ledger.expenses.push(Expense {
        id: id.clone(),
        date: date.format("%Y-%m-%d").to_string(),
        description: description.to_string(),
        amount: new.amount,
        time_cost: new.time_cost,
        needs_check: false,
        review_count: None,
        category: new.category,
        linked_goal_id,
        linked_task_id: new.linked_task_id,
        linked_task_type,
    });
    Ok(id)
}

#[derive(Debug, Clone)]
pub struct NewFixedExpense {
    pub description: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub custom_days: Option<u32>,
    pub category: FixedExpenseCategory,
}

pub fn add_fixed_expense(ledger: &mut Ledger, new: NewFixedExpense) -> Result<String, BudgetError> {
    check_amount(new.amount)?;
    let description = new.description.trim();
    if description.is_empty() {
        return Err(BudgetError::EmptyDescription);
    }
    if new.frequency == Frequency::Custom && !new.custom_days.is_some_and(|d| d > 0) {
        return Err(BudgetError::MissingCustomDays);
    }
    let id = next_id(ledger.fixed_expenses.iter().map(|f| f.id.as_str()), "F");
    ledger.fixed_expenses.push(FixedExpense {
        id: id.clone(),
        description: description.to_string(),
        amount: new.amount,
        frequency: new.frequency,
        custom_days: new.custom_days.filter(|_| new.frequency == Frequency::Custom),
        is_active: true,
        created_at: Utc::now().to_rfc3339(),
        category: new.category,
    });
    Ok(id)
}

fn check_amount(amount: f64) -> Result<(), BudgetError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(BudgetError::InvalidAmount(amount))
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Monthly cost of every active fixed expense
pub fn monthly_fixed_total(fixed: &[FixedExpense]) -> f64 {
    fixed
        .iter()
        .filter(|f| f.is_active)
        .map(FixedExpense::monthly_equivalent)
        .sum()
}

/// Sum of expenses per category; categories without expenses are absent
pub fn expense_totals(expenses: &[Expense]) -> BTreeMap<ExpenseCategory, f64> {
    let mut totals = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.category).or_insert(0.0) += expense.amount;
    }
    totals
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalAllocation {
    pub goal_id: String,
    pub title: String,
    pub allocated: f64,
    /// Cost of all the goal's tasks, for comparison with the allocation
    pub task_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    pub savings: f64,
    pub allocated: f64,
    pub unallocated: f64,
    /// Share of savings already earmarked, 0..=100
    pub progress: f64,
    pub goals: Vec<GoalAllocation>,
}

/// How `savings` is spread over the active goals' budgets
pub fn allocation(ledger: &Ledger, savings: f64) -> BudgetAllocation {
    let goals: Vec<GoalAllocation> = ledger
        .goals
        .iter()
        .filter(|g| g.is_active())
        .map(|g| GoalAllocation {
            goal_id: g.id.clone(),
            title: g.title.clone(),
            allocated: g.budget.unwrap_or(0.0),
            task_cost: ledger
                .tasks
                .iter()
                .filter(|t| t.goal_id == g.id)
                .map(|t| t.cost)
                .sum(),
        })
        .collect();
    let allocated: f64 = goals.iter().map(|g| g.allocated).sum();
    let progress = if savings > 0.0 {
        (allocated / savings * 100.0).min(100.0)
    } else {
        0.0
    };
    BudgetAllocation {
        savings,
        allocated,
        unallocated: savings - allocated,
        progress,
        goals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::goal::Goal;
    use crate::model::task::{TaskNode, TaskType};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::default();
        let mut trip = Goal::new("G-001", "Trip");
        trip.budget = Some(600.0);
        let mut done = Goal::new("G-002", "Old laptop");
        done.budget = Some(1000.0);
        done.completed = true;
        let mut bike = Goal::new("G-003", "Bike");
        bike.budget = Some(200.0);
        ledger.goals = vec![trip, done, bike, Goal::new("G-004", "  ")];
        let mut tickets = TaskNode::new("T-001", "G-001", None, TaskType::Pre, 0, "Tickets");
        tickets.cost = 450.0;
        ledger.tasks = vec![tickets];
        ledger
    }

    fn coffee(amount: f64) -> NewExpense {
        NewExpense {
            description: "Coffee".into(),
            amount,
            category: ExpenseCategory::Food,
            date: Some("2026-05-04".into()),
            time_cost: String::new(),
            linked_goal_id: None,
            linked_task_id: None,
        }
    }

    #[test]
    fn test_add_expense() {
        let mut ledger = sample_ledger();
        let id = add_expense(&mut ledger, coffee(3.5)).unwrap();
        assert_eq!(id, "E-001");
        assert_eq!(ledger.expenses[0].date, "2026-05-04");
        assert!(matches!(
            add_expense(&mut ledger, coffee(-1.0)),
            Err(BudgetError::InvalidAmount(_))
        ));
        let bad_date = NewExpense {
            date: Some("May 4th".into()),
            ..coffee(1.0)
        };
        assert!(matches!(
            add_expense(&mut ledger, bad_date),
            Err(BudgetError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_expense_links_task_both_ways() {
        let mut ledger = sample_ledger();
        let linked = NewExpense {
            linked_task_id: Some("T-001".into()),
            ..coffee(450.0)
        };
        let id = add_expense(&mut ledger, linked).unwrap();
        let expense = &ledger.expenses[0];
        assert_eq!(expense.linked_goal_id.as_deref(), Some("G-001"));
        assert_eq!(expense.linked_task_type, Some(TaskType::Pre));
        assert_eq!(ledger.task("T-001").unwrap().linked_expense_id, Some(id));

        let missing = NewExpense {
            linked_goal_id: Some("G-404".into()),
            ..coffee(1.0)
        };
        assert!(matches!(
            add_expense(&mut ledger, missing),
            Err(BudgetError::GoalNotFound(_))
        ));
    }

    #[test]
    fn test_fixed_expenses_monthly_total() {
        let mut ledger = Ledger::default();
        let rent = NewFixedExpense {
            description: "Rent".into(),
            amount: 1200.0,
            frequency: Frequency::Monthly,
            custom_days: None,
            category: FixedExpenseCategory::Housing,
        };
        add_fixed_expense(&mut ledger, rent.clone()).unwrap();
        add_fixed_expense(
            &mut ledger,
            NewFixedExpense {
                description: "Insurance".into(),
                amount: 600.0,
                frequency: Frequency::Yearly,
                ..rent.clone()
            },
        )
        .unwrap();
        add_fixed_expense(
            &mut ledger,
            NewFixedExpense {
                description: "Gym".into(),
                amount: 10.0,
                frequency: Frequency::Weekly,
                ..rent.clone()
            },
        )
        .unwrap();
        ledger.fixed_expenses[2].is_active = false;
        assert_eq!(ledger.fixed_expenses[1].id, "F-002");
        assert!(close(monthly_fixed_total(&ledger.fixed_expenses), 1250.0));

        let custom = NewFixedExpense {
            frequency: Frequency::Custom,
            ..rent
        };
        assert!(matches!(
            add_fixed_expense(&mut ledger, custom),
            Err(BudgetError::MissingCustomDays)
        ));
    }

    #[test]
    fn test_expense_totals_by_category() {
        let mut ledger = Ledger::default();
        add_expense(&mut ledger, coffee(3.0)).unwrap();
        add_expense(&mut ledger, coffee(4.5)).unwrap();
        add_expense(
            &mut ledger,
            NewExpense {
                category: ExpenseCategory::Capex,
                ..coffee(900.0)
            },
        )
        .unwrap();
        let totals = expense_totals(&ledger.expenses);
        assert_eq!(totals.len(), 2);
        assert!(close(totals[&ExpenseCategory::Food], 7.5));
        assert!(close(totals[&ExpenseCategory::Capex], 900.0));
    }

    #[test]
    fn test_allocation_over_active_goals() {
        let ledger = sample_ledger();
        let alloc = allocation(&ledger, 1000.0);
        let ids: Vec<&str> = alloc.goals.iter().map(|g| g.goal_id.as_str()).collect();
        assert_eq!(ids, vec!["G-001", "G-003"]);
        assert!(close(alloc.allocated, 800.0));
        assert!(close(alloc.unallocated, 200.0));
        assert!(close(alloc.progress, 80.0));
        assert!(close(alloc.goals[0].task_cost, 450.0));
    }

    #[test]
    fn test_allocation_progress_bounds() {
        let ledger = sample_ledger();
        assert!(close(allocation(&ledger, 400.0).progress, 100.0));
        assert!(close(allocation(&ledger, 0.0).progress, 0.0));
        assert!(close(allocation(&ledger, -5.0).progress, 0.0));
    }
}
