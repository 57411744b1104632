mod init;
pub use init::cmd_init;

use std::collections::HashSet;
use std::path::PathBuf;

use regex::RegexBuilder;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::lock::LedgerLock;
use crate::io::state::{ViewState, read_view_state, write_view_state};
use crate::io::{config_io, ledger_io};
use crate::model::task::{NewTask, TaskPatch, TaskType};
use crate::model::workspace::Workspace;
use crate::ops::task_ops::{DropReport, DropRequest};
use crate::ops::{budget_ops, check, goal_ops, search, task_ops};
use crate::tree::{DropOutcome, DropRejection, Reparent, TaskTree, descendant_ids};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Flags shared by every command
pub struct Context {
    pub json: bool,
    /// Absolute `-C` directory, if given
    pub ledger_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ledger_dir = match cli.ledger_dir {
        Some(ref dir) => Some(
            std::fs::canonicalize(dir)
                .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        ),
        None => None,
    };
    let ctx = Context {
        json: cli.json,
        ledger_dir,
    };

    match cli.command {
        Commands::Init(args) => cmd_init(args, &ctx),
        Commands::Goal(args) => cmd_goal(args, &ctx),

        // Tasks
        Commands::Add(args) => cmd_add(args, &ctx),
        Commands::Tree(args) => cmd_tree(args, &ctx),
        Commands::Show(args) => cmd_show(args, &ctx),
        Commands::Edit(args) => cmd_edit(args, &ctx),
        Commands::Done(args) => cmd_set_completed(args, true, &ctx),
        Commands::Undone(args) => cmd_set_completed(args, false, &ctx),
        Commands::Wand(args) => cmd_wand(args, &ctx),
        Commands::Rm(args) => cmd_rm(args, &ctx),
        Commands::Mv(args) => cmd_mv(args, &ctx),
        Commands::Drag(args) => cmd_drag(args, &ctx),
        Commands::Collapse(args) => cmd_collapse(args, &ctx),

        // Money
        Commands::Expense(args) => cmd_expense(args, &ctx),
        Commands::Fixed(args) => cmd_fixed(args, &ctx),
        Commands::Budget(args) => cmd_budget(args, &ctx),

        Commands::Check => cmd_check(&ctx),
        Commands::Search(args) => cmd_search(args, &ctx),
        Commands::Config(args) => cmd_config(args, &ctx),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ledger_root(ctx: &Context) -> Result<PathBuf, ledger_io::LedgerError> {
    let start = match &ctx.ledger_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    ledger_io::discover_ledger(&start)
}

fn load_workspace(ctx: &Context) -> Result<Workspace, ledger_io::LedgerError> {
    ledger_io::load_workspace(&ledger_root(ctx)?)
}

/// Load under the write lock, run `f`, and save the ledger if `f` succeeds.
fn with_workspace<T>(
    ctx: &Context,
    f: impl FnOnce(&mut Workspace) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    let root = ledger_root(ctx)?;
    let _lock = LedgerLock::acquire_default(&root.join(ledger_io::GOALPOST_DIR))?;
    let mut ws = ledger_io::load_workspace(&root)?;
    let out = f(&mut ws)?;
    ledger_io::save_ledger(&ws.dir, &ws.ledger)?;
    Ok(out)
}

fn view_state(ws: &Workspace) -> ViewState {
    read_view_state(&ws.dir).unwrap_or_default()
}

/// Drop collapsed IDs of tasks that no longer exist.
fn prune_view_state(ws: &Workspace) -> Result<(), std::io::Error> {
    let Some(mut state) = read_view_state(&ws.dir) else {
        return Ok(());
    };
    let before = state.clone();
    state.prune(&ws.ledger);
    if state != before {
        write_view_state(&ws.dir, &state)?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn rejection_reason(reason: DropRejection) -> &'static str {
    match reason {
        DropRejection::TargetLost => "the drop target is gone or not visible",
        DropRejection::Cycle => "a task cannot be dropped into its own subtree",
        DropRejection::MissingActive => "the dragged task does not exist",
    }
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

fn cmd_goal(args: GoalCmd, ctx: &Context) -> CmdResult {
    match args.action.unwrap_or(GoalAction::List) {
        GoalAction::Add(args) => {
            let id = with_workspace(ctx, |ws| {
                Ok(goal_ops::add_goal(&mut ws.ledger, &args.title, args.deadline.as_deref())?)
            })?;
            println!("{}", id);
            Ok(())
        }
        GoalAction::List => cmd_goal_list(ctx),
        GoalAction::Done(args) => with_workspace(ctx, |ws| {
            goal_ops::set_goal_completed(&mut ws.ledger, &args.id, !args.undo)?;
            Ok(())
        }),
        GoalAction::Wand(args) => {
            let on = with_workspace(ctx, |ws| Ok(goal_ops::toggle_goal_wand(&mut ws.ledger, &args.id)?))?;
            println!("{} wand {}", args.id, if on { "on" } else { "off" });
            Ok(())
        }
        GoalAction::Budget(args) => {
            let budget = if args.clear {
                None
            } else {
                Some(args.amount.ok_or("give an amount or --clear")?)
            };
            with_workspace(ctx, |ws| {
                goal_ops::set_goal_budget(&mut ws.ledger, &args.id, budget)?;
                Ok(())
            })
        }
        GoalAction::Rm(args) => {
            let removed = with_workspace(ctx, |ws| {
                let removed = goal_ops::delete_goal(&mut ws.ledger, &args.id)?;
                prune_view_state(ws)?;
                Ok(removed)
            })?;
            println!("deleted {} ({} tasks)", args.id, removed);
            Ok(())
        }
    }
}

fn cmd_goal_list(ctx: &Context) -> CmdResult {
    let ws = load_workspace(ctx)?;
    let summaries = goal_ops::goal_summaries(&ws.ledger);
    if ctx.json {
        return print_json(&summaries);
    }
    let currency = &ws.config.display.currency;
    for s in &summaries {
        println!(
            "{} {} {}  {}/{} done  {}{}",
            s.id,
            if s.completed { "[x]" } else { "[ ]" },
            s.title,
            s.completed_tasks,
            s.total_tasks,
            money(currency, s.total_cost),
            if s.is_magic_wand { " ★" } else { "" }
        );
        for wand in &s.wands {
            println!("      {} ({}): {}", wand.label, wand.task_type, wand.title);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks: read
// ---------------------------------------------------------------------------

fn cmd_tree(args: TreeArgs, ctx: &Context) -> CmdResult {
    let ws = load_workspace(ctx)?;
    if ws.ledger.goal(&args.goal).is_none() {
        return Err(format!("goal not found: {}", args.goal).into());
    }
    let state = view_state(&ws);
    let types: Vec<TaskType> = match args.task_type {
        Some(t) => vec![t],
        None => TaskType::ALL.to_vec(),
    };

    let mut sections = Vec::new();
    for task_type in types {
        let tree = TaskTree::with_policy(&ws.ledger.tasks, &args.goal, task_type, ws.config.tree.orphans);
        let collapsed = if args.all {
            HashSet::new()
        } else {
            state.collapsed_in(&args.goal, task_type)
        };
        let rows = tree.visible(&collapsed);
        sections.push((task_type, tree.wand_task().map(|t| t.title.clone()), rows, collapsed));
    }

    if ctx.json {
        let out: Vec<SectionJson> = sections
            .iter()
            .map(|(task_type, wand, rows, collapsed)| SectionJson {
                goal_id: args.goal.clone(),
                task_type: *task_type,
                wand: wand.clone(),
                rows: rows.iter().map(|r| row_to_json(r, collapsed)).collect(),
            })
            .collect();
        return if args.task_type.is_some() {
            print_json(&out[0])
        } else {
            print_json(&out)
        };
    }

    let currency = &ws.config.display.currency;
    let single = args.task_type.is_some();
    for (i, (task_type, wand, rows, collapsed)) in sections.iter().enumerate() {
        if !single {
            if i > 0 {
                println!();
            }
            println!("{}", task_type.label());
        }
        if let Some(title) = wand {
            println!("{}: {}", task_type.wand_label(), title);
        }
        if !rows.is_empty() {
            println!("{}", render_tree(rows, collapsed, currency));
        }
    }
    Ok(())
}

fn cmd_show(args: IdArg, ctx: &Context) -> CmdResult {
    let ws = load_workspace(ctx)?;
    let task = ws
        .ledger
        .task(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    let tree = TaskTree::with_policy(&ws.ledger.tasks, &task.goal_id, task.task_type, ws.config.tree.orphans);
    let depth = tree.get(&task.id).map(|item| item.depth);
    let descendants: Vec<String> = descendant_ids(&ws.ledger.tasks, &task.id).into_iter().collect();

    if ctx.json {
        return print_json(&TaskDetailJson {
            task,
            depth,
            descendants,
        });
    }

    let currency = &ws.config.display.currency;
    println!("{} {}", task.id, task.title);
    println!("  goal:     {} ({})", task.goal_id, task.task_type);
    if let Some(parent) = &task.parent_id {
        println!("  parent:   {}", parent);
    }
    match depth {
        Some(depth) => println!("  depth:    {}", depth),
        None => println!("  depth:    (hidden: parent missing)"),
    }
    if task.task_type.is_completable() {
        println!("  done:     {}", if task.completed { "yes" } else { "no" });
    }
    if task.is_magic_wand {
        println!("  wand:     {}", task.task_type.wand_label());
    }
    if task.cost != 0.0 {
        println!("  cost:     {}", money(currency, task.cost));
    }
    if !task.time_cost.is_empty() {
        println!("  time:     {}", task.time_cost);
    }
    if !task.deadline.is_empty() {
        println!("  deadline: {}", task.deadline);
    }
    if let Some(expense) = &task.linked_expense_id {
        println!("  expense:  {}", expense);
    }
    if !descendants.is_empty() {
        println!("  subtasks: {}", descendants.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks: write
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, ctx: &Context) -> CmdResult {
    let new = NewTask {
        title: args.title,
        cost: args.cost,
        time_cost: args.time.unwrap_or_default(),
        deadline: args.deadline.unwrap_or_default(),
    };
    let id = with_workspace(ctx, |ws| {
        Ok(task_ops::add_task(
            &mut ws.ledger,
            &args.goal,
            args.parent.as_deref(),
            args.task_type,
            new,
        )?)
    })?;
    println!("{}", id);
    Ok(())
}

fn cmd_edit(args: EditArgs, ctx: &Context) -> CmdResult {
    let patch = TaskPatch {
        title: args.title,
        cost: args.cost,
        time_cost: args.time,
        deadline: args.deadline,
        linked_expense_id: if args.unlink_expense {
            Some(None)
        } else {
            args.expense.map(Some)
        },
    };
    if patch.is_empty() {
        return Err("nothing to change (see gp edit --help)".into());
    }
    with_workspace(ctx, |ws| {
        if let Some(Some(expense_id)) = &patch.linked_expense_id
            && ws.ledger.expense(expense_id).is_none()
        {
            return Err(format!("expense not found: {}", expense_id).into());
        }
        task_ops::update_task(&mut ws.ledger, &args.id, patch)?;
        Ok(())
    })
}

fn cmd_set_completed(args: IdArg, completed: bool, ctx: &Context) -> CmdResult {
    with_workspace(ctx, |ws| {
        task_ops::set_completed(&mut ws.ledger, &args.id, completed)?;
        Ok(())
    })
}

fn cmd_wand(args: IdArg, ctx: &Context) -> CmdResult {
    let on = with_workspace(ctx, |ws| Ok(task_ops::toggle_wand(&mut ws.ledger, &args.id)?))?;
    println!("{} wand {}", args.id, if on { "on" } else { "off" });
    Ok(())
}

fn cmd_rm(args: IdArg, ctx: &Context) -> CmdResult {
    let removed = with_workspace(ctx, |ws| {
        let removed = task_ops::delete_task(&mut ws.ledger, &args.id)?;
        prune_view_state(ws)?;
        Ok(removed)
    })?;
    if ctx.json {
        return print_json(&removed);
    }
    println!("deleted {}", removed.join(", "));
    Ok(())
}

fn cmd_mv(args: MvArgs, ctx: &Context) -> CmdResult {
    if args.parent.is_none() && !args.root {
        return Err("give --parent <ID> or --root".into());
    }
    with_workspace(ctx, |ws| {
        task_ops::move_task(&mut ws.ledger, &args.id, args.parent.as_deref())?;
        Ok(())
    })
}

/// Project and commit one drop against a loaded workspace
fn run_drop(ws: &mut Workspace, args: &DragArgs) -> Result<DropReport, Box<dyn std::error::Error>> {
    let task = ws
        .ledger
        .task(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    let (goal_id, task_type) = (task.goal_id.clone(), task.task_type);
    let collapsed = view_state(ws).collapsed_in(&goal_id, task_type);
    let request = DropRequest {
        goal_id: &goal_id,
        task_type,
        active_id: &args.id,
        over_id: &args.over,
        offset_x: args.offset,
    };
    let tree_config = ws.config.tree.clone();
    Ok(task_ops::apply_drop(&mut ws.ledger, request, &collapsed, &tree_config))
}

fn cmd_drag(args: DragArgs, ctx: &Context) -> CmdResult {
    let report = if args.dry_run {
        let mut ws = load_workspace(ctx)?;
        run_drop(&mut ws, &args)?
    } else {
        // Only a committed drop rewrites the ledger
        let root = ledger_root(ctx)?;
        let _lock = LedgerLock::acquire_default(&root.join(ledger_io::GOALPOST_DIR))?;
        let mut ws = ledger_io::load_workspace(&root)?;
        let report = run_drop(&mut ws, &args)?;
        if report.outcome.is_committed() {
            ledger_io::save_ledger(&ws.dir, &ws.ledger)?;
        }
        report
    };
    tracing::debug!(id = %args.id, over = %args.over, offset = args.offset, "drag resolved");

    if ctx.json {
        print_json(&report)?;
    } else {
        if let Some(p) = &report.projection {
            match &p.parent_id {
                Some(parent) => println!("projection: depth {} under {}", p.depth, parent),
                None => println!("projection: depth {} at top level", p.depth),
            }
        }
        let verb = if args.dry_run { "would move" } else { "moved" };
        match &report.outcome {
            DropOutcome::Committed(commit) => {
                let position = commit
                    .siblings
                    .iter()
                    .position(|t| t.id == args.id)
                    .unwrap_or_default();
                match &commit.reparent {
                    Some(Reparent {
                        new_parent_id: Some(parent),
                        ..
                    }) => println!("{} {} under {} at position {}", verb, args.id, parent, position),
                    Some(_) => println!("{} {} to top level at position {}", verb, args.id, position),
                    None => println!("{} {} to position {}", verb, args.id, position),
                }
            }
            DropOutcome::Unchanged => println!("nothing to do"),
            DropOutcome::Rejected { .. } => {}
        }
    }

    if let DropOutcome::Rejected { reason } = report.outcome {
        return Err(format!("drop rejected: {}", rejection_reason(reason)).into());
    }
    Ok(())
}

fn cmd_collapse(args: CollapseArgs, ctx: &Context) -> CmdResult {
    let root = ledger_root(ctx)?;
    let _lock = LedgerLock::acquire_default(&root.join(ledger_io::GOALPOST_DIR))?;
    let ws = ledger_io::load_workspace(&root)?;
    let task = ws
        .ledger
        .task(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    let mut state = view_state(&ws);
    let collapsed = if args.expand {
        state.set_collapsed(&task.goal_id, task.task_type, &task.id, false);
        false
    } else {
        state.toggle(&task.goal_id, task.task_type, &task.id)
    };
    state.prune(&ws.ledger);
    write_view_state(&ws.dir, &state)?;
    println!("{} {}", args.id, if collapsed { "collapsed" } else { "expanded" });
    Ok(())
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

fn cmd_expense(args: ExpenseCmd, ctx: &Context) -> CmdResult {
    match args.action.unwrap_or(ExpenseAction::List(ExpenseListArgs::default())) {
        ExpenseAction::Add(args) => {
            let new = budget_ops::NewExpense {
                description: args.description,
                amount: args.amount,
                category: args.category,
                date: args.date,
                time_cost: args.time.unwrap_or_default(),
                linked_goal_id: args.goal,
                linked_task_id: args.task,
            };
            let id = with_workspace(ctx, |ws| Ok(budget_ops::add_expense(&mut ws.ledger, new)?))?;
            println!("{}", id);
            Ok(())
        }
        ExpenseAction::List(args) => {
            let ws = load_workspace(ctx)?;
            let expenses: Vec<_> = ws
                .ledger
                .expenses
                .iter()
                .filter(|e| args.category.is_none_or(|c| e.category == c))
                .collect();
            let owned: Vec<_> = expenses.iter().map(|e| (*e).clone()).collect();
            let totals = budget_ops::expense_totals(&owned);
            if ctx.json {
                return print_json(&ExpenseListJson { expenses, totals });
            }
            let currency = &ws.config.display.currency;
            for e in &expenses {
                println!(
                    "{} {} {:<9} {}  {}",
                    e.id,
                    e.date,
                    e.category.label(),
                    e.description,
                    money(currency, e.amount)
                );
            }
            if !totals.is_empty() {
                let rows: Vec<(String, f64)> = totals
                    .iter()
                    .map(|(category, total)| (category.label().to_string(), *total))
                    .collect();
                println!("\nTotals:");
                println!("{}", amount_table(&rows, currency));
            }
            Ok(())
        }
    }
}

fn cmd_fixed(args: FixedCmd, ctx: &Context) -> CmdResult {
    match args.action.unwrap_or(FixedAction::List) {
        FixedAction::Add(args) => {
            let new = budget_ops::NewFixedExpense {
                description: args.description,
                amount: args.amount,
                frequency: args.frequency,
                custom_days: args.days,
                category: args.category,
            };
            let id = with_workspace(ctx, |ws| Ok(budget_ops::add_fixed_expense(&mut ws.ledger, new)?))?;
            println!("{}", id);
            Ok(())
        }
        FixedAction::List => {
            let ws = load_workspace(ctx)?;
            let monthly_total = budget_ops::monthly_fixed_total(&ws.ledger.fixed_expenses);
            if ctx.json {
                let fixed = ws
                    .ledger
                    .fixed_expenses
                    .iter()
                    .map(|f| FixedRowJson {
                        fixed: f,
                        monthly: f.monthly_equivalent(),
                    })
                    .collect();
                return print_json(&FixedListJson { fixed, monthly_total });
            }
            let currency = &ws.config.display.currency;
            for f in &ws.ledger.fixed_expenses {
                let category = match f.category.group() {
                    Some(group) => format!("{} / {}", group, f.category.label()),
                    None => f.category.label().to_string(),
                };
                println!(
                    "{} {} ({}, {}){}  {}/mo",
                    f.id,
                    f.description,
                    f.frequency,
                    category,
                    if f.is_active { "" } else { " [inactive]" },
                    money(currency, f.monthly_equivalent())
                );
            }
            println!("Monthly total: {}", money(currency, monthly_total));
            Ok(())
        }
    }
}

fn cmd_budget(args: BudgetArgs, ctx: &Context) -> CmdResult {
    let ws = load_workspace(ctx)?;
    let out = BudgetJson {
        monthly_fixed: budget_ops::monthly_fixed_total(&ws.ledger.fixed_expenses),
        expense_total: ws.ledger.expenses.iter().map(|e| e.amount).sum(),
        allocation: budget_ops::allocation(&ws.ledger, args.savings),
    };
    if ctx.json {
        return print_json(&out);
    }
    let currency = &ws.config.display.currency;
    let summary = vec![
        ("Fixed costs / month".to_string(), out.monthly_fixed),
        ("Expenses recorded".to_string(), out.expense_total),
        ("Savings".to_string(), out.allocation.savings),
        ("Allocated".to_string(), out.allocation.allocated),
        ("Unallocated".to_string(), out.allocation.unallocated),
    ];
    println!("{}", amount_table(&summary, currency));
    println!("  Progress: {:.0}%", out.allocation.progress);
    if !out.allocation.goals.is_empty() {
        println!("\nGoals:");
        let goals: Vec<(String, f64)> = out
            .allocation
            .goals
            .iter()
            .map(|g| (format!("{} {}", g.goal_id, g.title), g.allocated))
            .collect();
        println!("{}", amount_table(&goals, currency));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Check / search / config
// ---------------------------------------------------------------------------

fn cmd_check(ctx: &Context) -> CmdResult {
    let ws = load_workspace(ctx)?;
    let result = check::check_ledger(&ws.ledger);

    if ctx.json {
        print_json(&result)?;
    } else {
        if !result.errors.is_empty() {
            println!("Errors:");
            for err in &result.errors {
                match err {
                    check::CheckError::DuplicateId { kind, id, count } => {
                        println!("  {} id {} is used {} times", kind, id, count);
                    }
                    check::CheckError::ParentCycle { task_ids } => {
                        println!("  parent cycle: {}", task_ids.join(" -> "));
                    }
                    check::CheckError::PartitionMismatch { task_id, parent_id } => {
                        println!("  {} has parent {} in another goal or section", task_id, parent_id);
                    }
                    check::CheckError::DanglingGoal { task_id, goal_id } => {
                        println!("  {} belongs to missing goal {}", task_id, goal_id);
                    }
                }
            }
        }
        if !result.warnings.is_empty() {
            if !result.errors.is_empty() {
                println!();
            }
            println!("Warnings:");
            for warn in &result.warnings {
                match warn {
                    check::CheckWarning::Orphan { task_id, parent_id } => {
                        println!("  {} has missing parent {}", task_id, parent_id);
                    }
                    check::CheckWarning::MultipleWands {
                        goal_id,
                        task_type,
                        parent_id,
                        task_ids,
                    } => {
                        println!(
                            "  [{}/{}] {} share one sibling group under {}",
                            goal_id,
                            task_type,
                            task_ids.join(", "),
                            parent_id.as_deref().unwrap_or("the top level")
                        );
                    }
                    check::CheckWarning::CompletedDream { task_id } => {
                        println!("  dream {} is marked done", task_id);
                    }
                    check::CheckWarning::NegativeCost { task_id, cost } => {
                        println!("  {} has negative cost {}", task_id, cost);
                    }
                    check::CheckWarning::DanglingExpenseLink { task_id, expense_id } => {
                        println!("  {} links missing expense {}", task_id, expense_id);
                    }
                }
            }
        }
        if result.valid {
            println!("✓ ledger is valid");
        } else {
            println!("✗ ledger has errors");
        }
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, ctx: &Context) -> CmdResult {
    let ws = load_workspace(ctx)?;
    let re = RegexBuilder::new(&args.pattern)
        .case_insensitive(args.ignore_case)
        .build()?;
    let hits = search::search(&ws.ledger, &re, args.goal.as_deref());
    if ctx.json {
        return print_json(&hits);
    }
    for hit in &hits {
        match hit.task_type {
            Some(task_type) => println!("[{}/{}] {} {}", hit.goal_id, task_type, hit.id, hit.title),
            None => println!("[goal] {} {}", hit.id, hit.title),
        }
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs, ctx: &Context) -> CmdResult {
    let root = ledger_root(ctx)?;
    let dir = root.join(ledger_io::GOALPOST_DIR);

    let config = match (args.key, args.value) {
        (Some(key), Some(value)) => {
            let _lock = LedgerLock::acquire_default(&dir)?;
            config_io::update_config(&dir, &key, &value)?
        }
        (Some(key), None) => {
            let (_, doc) = config_io::read_config(&dir)?;
            let value = key
                .split_once('.')
                .and_then(|(section, field)| doc.get(section)?.get(field))
                .ok_or_else(|| format!("{} is not set", key))?;
            match value.as_str() {
                Some(text) => println!("{}", text),
                None => println!("{}", value.to_string().trim()),
            }
            return Ok(());
        }
        _ => config_io::read_config(&dir)?.0,
    };

    if ctx.json {
        print_json(&config)
    } else {
        print!("{}", toml::to_string_pretty(&config)?);
        Ok(())
    }
}
