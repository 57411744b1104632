//! Whole-tree properties checked over a batch of generated sections.
//!
//! Forests come from a fixed-seed generator so failures reproduce; every
//! drag is tried against every hovered row at a spread of offsets.

use std::collections::{HashMap, HashSet};

use goalpost::model::task::{TaskNode, TaskType};
use goalpost::tree::{
    DropOutcome, DropRejection, FlattenedItem, TaskTree, build_tree, commit_drop, descendant_ids,
    flatten_tree, get_projection, visible_items,
};
use pretty_assertions::assert_eq;

const GOAL: &str = "G-001";
const INDENT: f64 = 24.0;
const OFFSETS: [f64; 7] = [-72.0, -36.0, -12.0, 0.0, 12.0, 24.0, 60.0];

/// Small linear congruential generator, enough for shuffling shapes
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

/// A section of `size` tasks. Each task picks an earlier task (or none) as its
/// parent, so the result is always a forest. Sort orders are scattered with
/// gaps and ties; a few tasks from another goal and section are mixed in.
fn section(seed: u64, size: usize) -> Vec<TaskNode> {
    let mut rng = Lcg(seed);
    let mut tasks = Vec::new();
    for i in 0..size {
        let parent = match rng.below(3) {
            0 => None,
            _ if i == 0 => None,
            _ => Some(format!("T-{:03}", rng.below(i) + 1)),
        };
        let sort_order = (rng.below(5) * 10) as i64;
        tasks.push(TaskNode::new(
            format!("T-{:03}", i + 1),
            GOAL,
            parent,
            TaskType::Pre,
            sort_order,
            format!("task {}", i + 1),
        ));
    }
    tasks.push(TaskNode::new("X-001", "G-002", None, TaskType::Pre, 0, "other goal"));
    tasks.push(TaskNode::new("X-002", GOAL, None, TaskType::Post, 0, "other section"));
    tasks
}

fn seeds() -> impl Iterator<Item = (u64, usize)> {
    (1..=12u64).map(|seed| (seed, 3 + (seed as usize % 6)))
}

fn ids(rows: &[FlattenedItem]) -> Vec<String> {
    rows.iter().map(|r| r.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Build and flatten
// ---------------------------------------------------------------------------

#[test]
fn flatten_lists_each_section_task_once() {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        let flat = flatten_tree(&build_tree(&tasks, GOAL, TaskType::Pre));

        let mut seen: Vec<String> = ids(&flat);
        seen.sort();
        let mut expected: Vec<String> = tasks
            .iter()
            .filter(|t| t.in_section(GOAL, TaskType::Pre))
            .map(|t| t.id.clone())
            .collect();
        expected.sort();
        assert_eq!(seen, expected, "seed {}", seed);
    }
}

#[test]
fn flattened_rows_reproduce_parent_links() {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        for row in flatten_tree(&build_tree(&tasks, GOAL, TaskType::Pre)) {
            let stored = tasks.iter().find(|t| t.id == row.id).unwrap();
            assert_eq!(row.parent_id, stored.parent_id, "seed {} row {}", seed, row.id);
        }
    }
}

#[test]
fn parents_precede_children_one_level_up() {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        let flat = flatten_tree(&build_tree(&tasks, GOAL, TaskType::Pre));
        let position: HashMap<&str, usize> =
            flat.iter().enumerate().map(|(i, r)| (r.id.as_str(), i)).collect();

        for (i, row) in flat.iter().enumerate() {
            match &row.parent_id {
                None => assert_eq!(row.depth, 0, "seed {} row {}", seed, row.id),
                Some(parent) => {
                    let p = position[parent.as_str()];
                    assert!(p < i, "seed {}: {} listed before its parent", seed, row.id);
                    assert_eq!(row.depth, flat[p].depth + 1, "seed {} row {}", seed, row.id);
                }
            }
        }
    }
}

#[test]
fn siblings_follow_sort_order() {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        let flat = flatten_tree(&build_tree(&tasks, GOAL, TaskType::Pre));

        let mut groups: HashMap<Option<String>, Vec<i64>> = HashMap::new();
        for row in &flat {
            groups
                .entry(row.parent_id.clone())
                .or_default()
                .push(row.task.sort_order);
        }
        for (parent, orders) in groups {
            let mut sorted = orders.clone();
            sorted.sort();
            assert_eq!(orders, sorted, "seed {} parent {:?}", seed, parent);
        }
    }
}

#[test]
fn child_count_is_the_whole_subtree() {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        let flat = flatten_tree(&build_tree(&tasks, GOAL, TaskType::Pre));
        for (i, row) in flat.iter().enumerate() {
            let run = flat[i + 1..]
                .iter()
                .take_while(|r| r.depth > row.depth)
                .count();
            assert_eq!(row.child_count, run, "seed {} row {}", seed, row.id);
            assert_eq!(
                row.child_count,
                descendant_ids(&tasks, &row.id).len(),
                "seed {} row {}",
                seed,
                row.id
            );
        }
    }
}

#[test]
fn collapsing_hides_exactly_the_descendants() {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        let flat = flatten_tree(&build_tree(&tasks, GOAL, TaskType::Pre));
        for row in &flat {
            let collapsed: HashSet<String> = [row.id.clone()].into();
            let hidden = descendant_ids(&tasks, &row.id);
            let expected: Vec<String> = ids(&flat)
                .into_iter()
                .filter(|id| !hidden.contains(id))
                .collect();
            assert_eq!(ids(&visible_items(&flat, &collapsed)), expected, "seed {} row {}", seed, row.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[test]
fn projection_stays_within_neighbour_bounds() {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        let flat = TaskTree::new(&tasks, GOAL, TaskType::Pre).flat;
        for active in &flat {
            let rest: Vec<&FlattenedItem> = flat.iter().filter(|r| r.id != active.id).collect();
            for (over_index, over) in rest.iter().enumerate() {
                let max_depth = over.depth + 1;
                let min_depth = rest.get(over_index + 1).map_or(0, |n| n.depth).min(max_depth);
                for offset in OFFSETS {
                    let p = get_projection(&flat, &active.id, &over.id, offset, INDENT);
                    assert!(
                        p.depth >= min_depth && p.depth <= max_depth,
                        "seed {}: {} over {} at {} projected to depth {}",
                        seed,
                        active.id,
                        over.id,
                        offset,
                        p.depth
                    );
                    if let Some(parent) = &p.parent_id {
                        let parent_row = flat.iter().find(|r| &r.id == parent).unwrap();
                        assert_eq!(parent_row.depth + 1, p.depth);
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Run every drag of every row over every other row and check the result.
fn for_each_drop(mut check: impl FnMut(u64, &[TaskNode], &str, &str, &DropOutcome)) {
    for (seed, size) in seeds() {
        let tasks = section(seed, size);
        let flat = TaskTree::new(&tasks, GOAL, TaskType::Pre).flat;
        for active in &flat {
            for over in flat.iter().filter(|r| r.id != active.id) {
                for offset in OFFSETS {
                    let p = get_projection(&flat, &active.id, &over.id, offset, INDENT);
                    let outcome = commit_drop(&tasks, GOAL, TaskType::Pre, &active.id, &over.id, &p);
                    check(seed, &tasks, &active.id, &over.id, &outcome);
                }
            }
        }
    }
}

#[test]
fn drops_never_lose_or_cycle_tasks() {
    for_each_drop(|seed, tasks, active, over, outcome| {
        let after = outcome.apply(tasks);
        assert_eq!(after.len(), tasks.len());

        // Every task still reachable from a root means no cycle was created
        let before_rows = TaskTree::new(tasks, GOAL, TaskType::Pre).len();
        let after_rows = TaskTree::new(&after, GOAL, TaskType::Pre).len();
        assert_eq!(after_rows, before_rows, "seed {}: {} over {}", seed, active, over);

        // Other partitions are never touched
        for (a, b) in tasks.iter().zip(&after) {
            if !a.in_section(GOAL, TaskType::Pre) {
                assert_eq!(a, b);
            }
        }
    });
}

#[test]
fn committed_groups_are_renumbered() {
    for_each_drop(|seed, _, active, over, outcome| {
        if let DropOutcome::Committed(commit) = outcome {
            let orders: Vec<i64> = commit.siblings.iter().map(|t| t.sort_order).collect();
            let expected: Vec<i64> = (0..commit.siblings.len() as i64).collect();
            assert_eq!(orders, expected, "seed {}: {} over {}", seed, active, over);

            let parents: HashSet<Option<&str>> =
                commit.siblings.iter().map(|t| t.parent_id.as_deref()).collect();
            assert_eq!(parents.len(), 1, "siblings share one parent");
            assert!(commit.siblings.iter().any(|t| t.id == active));
        }
    });
}

#[test]
fn live_drops_only_reject_cycles() {
    for_each_drop(|seed, _, active, over, outcome| {
        if let DropOutcome::Rejected { reason } = outcome {
            assert_eq!(*reason, DropRejection::Cycle, "seed {}: {} over {}", seed, active, over);
        }
    });
}

#[test]
fn wand_holders_stay_unique_per_group() {
    for (seed, size) in seeds() {
        let mut tasks = section(seed, size);
        // One wand on a root and one on a nested task
        let in_section: Vec<usize> = tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.in_section(GOAL, TaskType::Pre))
            .map(|(i, _)| i)
            .collect();
        for &i in &in_section {
            if tasks[i].parent_id.is_none() {
                tasks[i].is_magic_wand = true;
                break;
            }
        }
        if let Some(&i) = in_section.iter().rev().find(|&&i| tasks[i].parent_id.is_some()) {
            tasks[i].is_magic_wand = true;
        }

        let flat = TaskTree::new(&tasks, GOAL, TaskType::Pre).flat;
        for active in &flat {
            for over in flat.iter().filter(|r| r.id != active.id) {
                for offset in OFFSETS {
                    let p = get_projection(&flat, &active.id, &over.id, offset, INDENT);
                    let outcome = commit_drop(&tasks, GOAL, TaskType::Pre, &active.id, &over.id, &p);
                    if let DropOutcome::Committed(commit) = &outcome
                        && commit.reparent.is_some()
                    {
                        let wands = commit.siblings.iter().filter(|t| t.is_magic_wand).count();
                        assert!(wands <= 1, "seed {}: {} over {}", seed, active.id, over.id);
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

fn visa_section() -> Vec<TaskNode> {
    vec![
        TaskNode::new("T-001", GOAL, None, TaskType::Pre, 0, "Visa"),
        TaskNode::new("T-002", GOAL, Some("T-001".into()), TaskType::Pre, 0, "Forms"),
        TaskNode::new("T-003", GOAL, None, TaskType::Pre, 1, "Photos"),
        TaskNode::new("T-004", GOAL, None, TaskType::Pre, 2, "Flights"),
    ]
}

fn drop_at(tasks: &[TaskNode], active: &str, over: &str, offset: f64) -> Vec<TaskNode> {
    let flat = TaskTree::new(tasks, GOAL, TaskType::Pre).flat;
    let p = get_projection(&flat, active, over, offset, INDENT);
    commit_drop(tasks, GOAL, TaskType::Pre, active, over, &p).apply(tasks)
}

fn outline(tasks: &[TaskNode]) -> Vec<String> {
    TaskTree::new(tasks, GOAL, TaskType::Pre)
        .flat
        .iter()
        .map(|r| format!("{}{}", "  ".repeat(r.depth), r.id))
        .collect()
}

#[test]
fn nest_under_previous_root() {
    let after = drop_at(&visa_section(), "T-003", "T-002", 24.0);
    assert_eq!(outline(&after), vec!["T-001", "  T-002", "  T-003", "T-004"]);
}

#[test]
fn zero_offset_over_nested_child_stays_at_root() {
    let tasks = visa_section();
    let flat = TaskTree::new(&tasks, GOAL, TaskType::Pre).flat;
    let p = get_projection(&flat, "T-003", "T-002", 0.0, INDENT);
    assert_eq!(p.depth, 0);
    assert_eq!(p.parent_id, None);

    let outcome = commit_drop(&tasks, GOAL, TaskType::Pre, "T-003", "T-002", &p);
    assert_eq!(outcome, DropOutcome::Unchanged);
    assert_eq!(outline(&outcome.apply(&tasks)), outline(&tasks));
}

#[test]
fn outdent_to_top_level() {
    let after = drop_at(&visa_section(), "T-002", "T-004", -24.0);
    assert_eq!(outline(&after), vec!["T-001", "T-003", "T-004", "T-002"]);
}

#[test]
fn reorder_roots() {
    let after = drop_at(&visa_section(), "T-001", "T-003", 0.0);
    assert_eq!(outline(&after), vec!["T-003", "T-001", "  T-002", "T-004"]);
}

#[test]
fn drop_into_own_child_is_refused() {
    let tasks = visa_section();
    let flat = TaskTree::new(&tasks, GOAL, TaskType::Pre).flat;
    let p = get_projection(&flat, "T-001", "T-002", 48.0, INDENT);
    assert_eq!(p.parent_id.as_deref(), Some("T-002"));
    let outcome = commit_drop(&tasks, GOAL, TaskType::Pre, "T-001", "T-002", &p);
    assert_eq!(outcome, DropOutcome::rejected(DropRejection::Cycle));
    assert_eq!(outcome.apply(&tasks), tasks);
}
