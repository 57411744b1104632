use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::model::ledger::Ledger;
use crate::model::task::TaskType;

/// Structured result from `gp check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A structural error: the trees cannot be trusted until it is fixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The same ID is used by more than one record of a kind
    #[serde(rename = "duplicate_id")]
    DuplicateId {
        kind: &'static str,
        id: String,
        count: usize,
    },
    /// Following parent links loops back; members listed child-to-parent
    #[serde(rename = "parent_cycle")]
    ParentCycle { task_ids: Vec<String> },
    /// Parent exists but belongs to another goal or task type
    #[serde(rename = "partition_mismatch")]
    PartitionMismatch { task_id: String, parent_id: String },
    /// Task points at a goal that does not exist
    #[serde(rename = "dangling_goal")]
    DanglingGoal { task_id: String, goal_id: String },
}

/// A non-critical issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Parent does not exist; the task is hidden (or promoted) in views
    #[serde(rename = "orphan")]
    Orphan { task_id: String, parent_id: String },
    /// More than one wand in a sibling group
    #[serde(rename = "multiple_wands")]
    MultipleWands {
        goal_id: String,
        task_type: TaskType,
        parent_id: Option<String>,
        task_ids: Vec<String>,
    },
    #[serde(rename = "completed_dream")]
    CompletedDream { task_id: String },
    #[serde(rename = "negative_cost")]
    NegativeCost { task_id: String, cost: f64 },
    /// Task links an expense that does not exist
    #[serde(rename = "dangling_expense_link")]
    DanglingExpenseLink { task_id: String, expense_id: String },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate a ledger and return structured results. Read-only.
pub fn check_ledger(ledger: &Ledger) -> CheckResult {
    let mut result = CheckResult::default();

    check_duplicates("goal", ledger.goals.iter().map(|g| g.id.as_str()), &mut result);
    check_duplicates("task", ledger.tasks.iter().map(|t| t.id.as_str()), &mut result);
    check_duplicates("expense", ledger.expenses.iter().map(|e| e.id.as_str()), &mut result);
    check_duplicates(
        "fixed_expense",
        ledger.fixed_expenses.iter().map(|f| f.id.as_str()),
        &mut result,
    );

    for cycle in find_cycles(ledger) {
        result.errors.push(CheckError::ParentCycle { task_ids: cycle });
    }

    check_links(ledger, &mut result);
    check_wands(ledger, &mut result);

    result.valid = result.errors.is_empty();
    tracing::debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "checked ledger"
    );
    result
}

fn check_duplicates<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>, result: &mut CheckResult) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    for (id, count) in counts {
        if count > 1 {
            result.errors.push(CheckError::DuplicateId {
                kind,
                id: id.to_string(),
                count,
            });
        }
    }
}

/// Every distinct parent-link cycle, each reported once
fn find_cycles(ledger: &Ledger) -> Vec<Vec<String>> {
    let mut parent_of: HashMap<&str, &str> = HashMap::new();
    for task in &ledger.tasks {
        if let Some(parent) = task.parent_id.as_deref() {
            parent_of.entry(task.id.as_str()).or_insert(parent);
        }
    }

    let mut settled: HashSet<&str> = HashSet::new();
    let mut cycles = Vec::new();
    for task in &ledger.tasks {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashMap<&str, usize> = HashMap::new();
        let mut current = Some(task.id.as_str());
        while let Some(id) = current {
            if settled.contains(id) {
                break;
            }
            if let Some(&start) = on_path.get(id) {
                cycles.push(path[start..].iter().map(|s| s.to_string()).collect());
                break;
            }
            on_path.insert(id, path.len());
            path.push(id);
            current = parent_of.get(id).copied();
        }
        settled.extend(path);
    }
    cycles
}

fn check_links(ledger: &Ledger, result: &mut CheckResult) {
    let goal_ids: HashSet<&str> = ledger.goals.iter().map(|g| g.id.as_str()).collect();
    let expense_ids: HashSet<&str> = ledger.expenses.iter().map(|e| e.id.as_str()).collect();
    let by_id: HashMap<&str, _> = ledger.tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    for task in &ledger.tasks {
        if !goal_ids.contains(task.goal_id.as_str()) {
            result.errors.push(CheckError::DanglingGoal {
                task_id: task.id.clone(),
                goal_id: task.goal_id.clone(),
            });
        }

        if let Some(parent_id) = &task.parent_id {
            match by_id.get(parent_id.as_str()) {
                None => result.warnings.push(CheckWarning::Orphan {
                    task_id: task.id.clone(),
                    parent_id: parent_id.clone(),
                }),
                Some(parent) if !parent.in_section(&task.goal_id, task.task_type) => {
                    result.errors.push(CheckError::PartitionMismatch {
                        task_id: task.id.clone(),
                        parent_id: parent_id.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        if task.task_type == TaskType::Dream && task.completed {
            result.warnings.push(CheckWarning::CompletedDream {
                task_id: task.id.clone(),
            });
        }
        if task.cost < 0.0 {
            result.warnings.push(CheckWarning::NegativeCost {
                task_id: task.id.clone(),
                cost: task.cost,
            });
        }
        if let Some(expense_id) = &task.linked_expense_id
            && !expense_ids.contains(expense_id.as_str())
        {
            result.warnings.push(CheckWarning::DanglingExpenseLink {
                task_id: task.id.clone(),
                expense_id: expense_id.clone(),
            });
        }
    }
}

fn check_wands(ledger: &Ledger, result: &mut CheckResult) {
    let mut groups: Vec<((&str, TaskType, Option<&str>), Vec<String>)> = Vec::new();
    for task in ledger.tasks.iter().filter(|t| t.is_magic_wand) {
        let key = (task.goal_id.as_str(), task.task_type, task.parent_id.as_deref());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, ids)) => ids.push(task.id.clone()),
            None => groups.push((key, vec![task.id.clone()])),
        }
    }
    for ((goal_id, task_type, parent_id), task_ids) in groups {
        if task_ids.len() > 1 {
            result.warnings.push(CheckWarning::MultipleWands {
                goal_id: goal_id.to_string(),
                task_type,
                parent_id: parent_id.map(String::from),
                task_ids,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
