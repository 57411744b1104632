use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::expense::{Expense, ExpenseCategory, FixedExpense};
use crate::model::task::{TaskNode, TaskType};
use crate::ops::budget_ops::BudgetAllocation;
use crate::tree::FlattenedItem;
use crate::util::unicode::{fit_to_width, truncate_to_width};

/// Titles longer than this are cut with `…` in tree and list output
const TITLE_CELLS: usize = 60;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRowJson {
    pub id: String,
    pub parent_id: Option<String>,
    pub depth: usize,
    pub child_count: usize,
    pub collapsed: bool,
    pub title: String,
    pub cost: f64,
    pub completed: bool,
    pub is_magic_wand: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionJson {
    pub goal_id: String,
    pub task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wand: Option<String>,
    pub rows: Vec<TreeRowJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailJson<'a> {
    #[serde(flatten)]
    pub task: &'a TaskNode,
    pub depth: Option<usize>,
    pub descendants: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListJson<'a> {
    pub expenses: Vec<&'a Expense>,
    pub totals: BTreeMap<ExpenseCategory, f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedRowJson<'a> {
    #[serde(flatten)]
    pub fixed: &'a FixedExpense,
    pub monthly: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedListJson<'a> {
    pub fixed: Vec<FixedRowJson<'a>>,
    pub monthly_total: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetJson {
    pub monthly_fixed: f64,
    pub expense_total: f64,
    pub allocation: BudgetAllocation,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn row_to_json(item: &FlattenedItem, collapsed: &HashSet<String>) -> TreeRowJson {
    TreeRowJson {
        id: item.id.clone(),
        parent_id: item.parent_id.clone(),
        depth: item.depth,
        child_count: item.child_count,
        collapsed: item.child_count > 0 && collapsed.contains(&item.id),
        title: item.task.title.clone(),
        cost: item.task.cost,
        completed: item.task.completed,
        is_magic_wand: item.task.is_magic_wand,
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn money(currency: &str, amount: f64) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", currency, -amount)
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

/// Checkbox for completable tasks, nothing for dreams
fn checkbox(task: &TaskNode) -> &'static str {
    match (task.task_type.is_completable(), task.completed) {
        (false, _) => "",
        (true, true) => "[x] ",
        (true, false) => "[ ] ",
    }
}

/// One tree line: two spaces per depth, then a marker (`▾` expanded parent,
/// `▸` collapsed parent, `·` leaf), the ID and the title.
pub fn tree_line(item: &FlattenedItem, collapsed: bool, currency: &str) -> String {
    let marker = match (item.child_count > 0, collapsed) {
        (true, true) => '▸',
        (true, false) => '▾',
        (false, _) => '·',
    };
    let mut line = format!(
        "{}{} {} {}{}",
        "  ".repeat(item.depth),
        marker,
        item.id,
        checkbox(&item.task),
        truncate_to_width(&item.task.title, TITLE_CELLS)
    );
    if item.task.cost > 0.0 {
        line.push_str("  ");
        line.push_str(&money(currency, item.task.cost));
    }
    if item.task.is_magic_wand {
        line.push_str(" ★");
    }
    line
}

pub fn render_tree(rows: &[FlattenedItem], collapsed: &HashSet<String>, currency: &str) -> String {
    rows.iter()
        .map(|item| tree_line(item, collapsed.contains(&item.id), currency))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Label/amount table with the labels padded to a common width
pub fn amount_table(rows: &[(String, f64)], currency: &str) -> String {
    let label_width = rows
        .iter()
        .map(|(label, _)| crate::util::unicode::display_width(label))
        .max()
        .unwrap_or(0)
        .min(TITLE_CELLS);
    rows.iter()
        .map(|(label, amount)| {
            format!(
                "  {}  {:>12}",
                fit_to_width(label, label_width),
                money(currency, *amount)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TaskTree;
    use insta::assert_snapshot;

    fn section() -> Vec<TaskNode> {
        let mut visa = TaskNode::new("T-001", "G-001", None, TaskType::Pre, 0, "Visa");
        visa.cost = 120.0;
        visa.is_magic_wand = true;
        let mut forms = TaskNode::new("T-002", "G-001", Some("T-001".into()), TaskType::Pre, 0, "Forms");
        forms.completed = true;
        let photos = TaskNode::new("T-003", "G-001", Some("T-002".into()), TaskType::Pre, 0, "Photos");
        let flights = TaskNode::new("T-004", "G-001", None, TaskType::Pre, 1, "Flights");
        vec![visa, forms, photos, flights]
    }

    #[test]
    fn tree_expanded() {
        let tree = TaskTree::new(&section(), "G-001", TaskType::Pre);
        let collapsed = HashSet::new();
        assert_snapshot!(render_tree(&tree.visible(&collapsed), &collapsed, "$"), @r"
        ▾ T-001 [ ] Visa  $120.00 ★
          ▾ T-002 [x] Forms
            · T-003 [ ] Photos
        · T-004 [ ] Flights
        ");
    }

    #[test]
    fn tree_collapsed() {
        let tree = TaskTree::new(&section(), "G-001", TaskType::Pre);
        let collapsed: HashSet<String> = ["T-002".to_string()].into();
        assert_snapshot!(render_tree(&tree.visible(&collapsed), &collapsed, "€"), @r"
        ▾ T-001 [ ] Visa  €120.00 ★
          ▸ T-002 [x] Forms
        · T-004 [ ] Flights
        ");
    }

    #[test]
    fn dreams_have_no_checkbox() {
        let dream = TaskNode::new("T-009", "G-001", None, TaskType::Dream, 0, "Sail");
        let tree = TaskTree::new(&[dream], "G-001", TaskType::Dream);
        assert_eq!(tree_line(&tree.flat[0], false, "$"), "· T-009 Sail");
    }

    #[test]
    fn row_json_marks_collapse_only_on_parents() {
        let tree = TaskTree::new(&section(), "G-001", TaskType::Pre);
        let collapsed: HashSet<String> = ["T-001".to_string(), "T-004".to_string()].into();
        let rows: Vec<TreeRowJson> = tree.flat.iter().map(|i| row_to_json(i, &collapsed)).collect();
        assert!(rows[0].collapsed);
        assert!(!rows[3].collapsed);
        assert_eq!(rows[0].child_count, 2);
    }

    #[test]
    fn money_formatting() {
        assert_eq!(money("$", 3.5), "$3.50");
        assert_eq!(money("$", -12.0), "-$12.00");
    }

    #[test]
    fn amount_table_aligns() {
        let rows = vec![("Rent".to_string(), 1200.0), ("Insurance".to_string(), 50.0)];
        let expected = format!(
            "  Rent{}$1200.00\n  Insurance{}$50.00",
            " ".repeat(11),
            " ".repeat(8)
        );
        assert_eq!(amount_table(&rows, "$"), expected);
    }
}
