use std::collections::{HashMap, HashSet};

use crate::model::config::OrphanPolicy;
use crate::model::task::{TaskNode, TaskType};

/// A task with its ordered children, rebuilt from the flat store on demand
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub task: TaskNode,
    pub children: Vec<TreeNode>,
    /// Nesting depth (0 = root)
    pub depth: usize,
}

/// Build the forest for one `(goal_id, task_type)` section.
///
/// Tasks are ordered by `sort_order` with ties kept in collection order.
/// A task whose parent is not part of the section is an orphan and is left
/// out together with its subtree.
pub fn build_tree(tasks: &[TaskNode], goal_id: &str, task_type: TaskType) -> Vec<TreeNode> {
    build_tree_with(tasks, goal_id, task_type, OrphanPolicy::Drop)
}

/// Build the forest for one section with an explicit orphan policy.
///
/// With [`OrphanPolicy::Promote`] orphans are appended after the real roots
/// (in sort order) at depth 0, carrying their subtrees with them.
pub fn build_tree_with(
    tasks: &[TaskNode],
    goal_id: &str,
    task_type: TaskType,
    orphans: OrphanPolicy,
) -> Vec<TreeNode> {
    let mut section: Vec<&TaskNode> = tasks
        .iter()
        .filter(|t| t.in_section(goal_id, task_type))
        .collect();
    // Vec::sort_by_key is stable
    section.sort_by_key(|t| t.sort_order);

    let mut by_parent: HashMap<Option<&str>, Vec<&TaskNode>> = HashMap::new();
    for task in &section {
        by_parent
            .entry(task.parent_id.as_deref())
            .or_default()
            .push(task);
    }

    let mut emitted = HashSet::new();
    let mut roots = build_children(None, 0, &by_parent, &mut emitted);

    if orphans == OrphanPolicy::Promote {
        let ids: HashSet<&str> = section.iter().map(|t| t.id.as_str()).collect();
        for task in &section {
            let Some(parent) = task.parent_id.as_deref() else {
                continue;
            };
            if ids.contains(parent) || !emitted.insert(task.id.as_str()) {
                continue;
            }
            roots.push(TreeNode {
                task: (*task).clone(),
                children: build_children(Some(task.id.as_str()), 1, &by_parent, &mut emitted),
                depth: 0,
            });
        }
    }

    roots
}

fn build_children<'a>(
    parent_id: Option<&'a str>,
    depth: usize,
    by_parent: &HashMap<Option<&'a str>, Vec<&'a TaskNode>>,
    emitted: &mut HashSet<&'a str>,
) -> Vec<TreeNode> {
    let Some(children) = by_parent.get(&parent_id) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(children.len());
    for task in children {
        // Duplicate ids would otherwise recurse forever
        if !emitted.insert(task.id.as_str()) {
            continue;
        }
        nodes.push(TreeNode {
            task: (*task).clone(),
            children: build_children(Some(task.id.as_str()), depth + 1, by_parent, emitted),
            depth,
        });
    }
    nodes
}
