use clap::{Args, Parser, Subcommand};

use crate::model::expense::{ExpenseCategory, FixedExpenseCategory, Frequency};
use crate::model::task::TaskType;

#[derive(Parser)]
#[command(name = "gp", about = concat!("goalpost v", env!("CARGO_PKG_VERSION"), " - goals, task trees and the money behind them"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different ledger directory
    #[arg(short = 'C', long = "ledger-dir", global = true)]
    pub ledger_dir: Option<String>,

    /// Log more to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a ledger in the current directory
    Init(InitArgs),
    /// Goal management
    Goal(GoalCmd),
    /// Add a task to a goal's pre, post or dream tree
    Add(AddArgs),
    /// Print a goal's task tree
    Tree(TreeArgs),
    /// Show task details
    Show(IdArg),
    /// Change a task's title, cost, time, deadline or linked expense
    Edit(EditArgs),
    /// Mark a task done
    Done(IdArg),
    /// Mark a task not done
    Undone(IdArg),
    /// Toggle the magic wand on a task
    Wand(IdArg),
    /// Delete a task and its subtasks
    Rm(IdArg),
    /// Reparent a task (appended to the new sibling group)
    Mv(MvArgs),
    /// Drop a task over another row, as a drag gesture would
    Drag(DragArgs),
    /// Collapse or expand a task in tree output
    Collapse(CollapseArgs),
    /// Record or list one-off expenses
    Expense(ExpenseCmd),
    /// Record or list recurring expenses
    Fixed(FixedCmd),
    /// Show monthly costs and how savings are allocated to goals
    Budget(BudgetArgs),
    /// Validate ledger integrity
    Check,
    /// Search goal and task titles by regex
    Search(SearchArgs),
    /// Show the config, or set one key
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Ledger name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct GoalCmd {
    #[command(subcommand)]
    pub action: Option<GoalAction>,
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a goal
    Add(GoalAddArgs),
    /// List goals with progress (default)
    List,
    /// Mark a goal complete
    Done(GoalDoneArgs),
    /// Toggle the goal wand (at most one goal holds it)
    Wand(GoalIdArg),
    /// Set or clear the savings earmarked for a goal
    Budget(GoalBudgetArgs),
    /// Delete a goal and all its tasks
    Rm(GoalIdArg),
}

#[derive(Args)]
pub struct GoalAddArgs {
    /// Goal title
    pub title: String,
    /// Deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct GoalIdArg {
    /// Goal ID
    pub id: String,
}

#[derive(Args)]
pub struct GoalDoneArgs {
    /// Goal ID
    pub id: String,
    /// Reopen instead of completing
    #[arg(long)]
    pub undo: bool,
}

#[derive(Args)]
pub struct GoalBudgetArgs {
    /// Goal ID
    pub id: String,
    /// Amount to earmark (omit with --clear)
    pub amount: Option<f64>,
    /// Remove the allocation
    #[arg(long, conflicts_with = "amount")]
    pub clear: bool,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Goal ID
    pub goal: String,
    /// Section: pre, post or dream
    pub task_type: TaskType,
    /// Task title
    pub title: String,
    /// Add as a subtask of this task
    #[arg(long)]
    pub parent: Option<String>,
    /// Money cost
    #[arg(long, default_value_t = 0.0)]
    pub cost: f64,
    /// Time cost (free text, e.g. "2h")
    #[arg(long)]
    pub time: Option<String>,
    /// Deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Goal ID
    pub goal: String,
    /// Section: pre, post or dream (default: all three)
    pub task_type: Option<TaskType>,
    /// Ignore collapse state and print every row
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub cost: Option<f64>,
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub deadline: Option<String>,
    /// Link an expense by ID
    #[arg(long, conflicts_with = "unlink_expense")]
    pub expense: Option<String>,
    /// Remove the linked expense
    #[arg(long)]
    pub unlink_expense: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID
    pub id: String,
    /// New parent task ID
    #[arg(long, conflicts_with = "root")]
    pub parent: Option<String>,
    /// Move to the top level
    #[arg(long)]
    pub root: bool,
}

#[derive(Args)]
pub struct DragArgs {
    /// Task being dragged
    pub id: String,
    /// Row the pointer is over when released
    #[arg(long)]
    pub over: String,
    /// Horizontal pointer travel in pixels (negative drags left)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset: f64,
    /// Print the projection without committing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CollapseArgs {
    /// Task ID
    pub id: String,
    /// Expand instead of toggling
    #[arg(long)]
    pub expand: bool,
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExpenseCmd {
    #[command(subcommand)]
    pub action: Option<ExpenseAction>,
}

#[derive(Subcommand)]
pub enum ExpenseAction {
    /// Record an expense
    Add(ExpenseAddArgs),
    /// List expenses with per-category totals (default)
    List(ExpenseListArgs),
}

#[derive(Args)]
pub struct ExpenseAddArgs {
    pub description: String,
    pub amount: f64,
    /// food, lifestyle, family, misc, opex, capex or gna
    #[arg(long, default_value = "misc")]
    pub category: ExpenseCategory,
    /// Date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,
    /// Time cost (free text)
    #[arg(long)]
    pub time: Option<String>,
    /// Link to a goal
    #[arg(long)]
    pub goal: Option<String>,
    /// Link to a task (implies its goal)
    #[arg(long)]
    pub task: Option<String>,
}

#[derive(Args, Default)]
pub struct ExpenseListArgs {
    /// Only this category
    #[arg(long)]
    pub category: Option<ExpenseCategory>,
}

#[derive(Args)]
pub struct FixedCmd {
    #[command(subcommand)]
    pub action: Option<FixedAction>,
}

#[derive(Subcommand)]
pub enum FixedAction {
    /// Record a recurring expense
    Add(FixedAddArgs),
    /// List recurring expenses with monthly equivalents (default)
    List,
}

#[derive(Args)]
pub struct FixedAddArgs {
    pub description: String,
    pub amount: f64,
    /// weekly, bi-weekly, bi-monthly, monthly, quarterly, yearly or custom
    #[arg(long, default_value = "monthly")]
    pub frequency: Frequency,
    /// Days between payments (custom frequency only)
    #[arg(long)]
    pub days: Option<u32>,
    /// e.g. housing, utilities-gas, transport, liabilities-loans
    #[arg(long, default_value = "housing")]
    pub category: FixedExpenseCategory,
}

#[derive(Args)]
pub struct BudgetArgs {
    /// Current savings to allocate
    #[arg(long, default_value_t = 0.0)]
    pub savings: f64,
}

// ---------------------------------------------------------------------------
// Search / config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern
    pub pattern: String,
    /// Only this goal
    #[arg(long)]
    pub goal: Option<String>,
    /// Case-insensitive match
    #[arg(short, long)]
    pub ignore_case: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Key to set: ledger.name, tree.indent_width, tree.orphans, display.currency
    pub key: Option<String>,
    /// New value
    #[arg(requires = "key")]
    pub value: Option<String>,
}
