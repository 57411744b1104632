use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::config::OrphanPolicy;
use crate::model::task::{TaskNode, TaskType};

use super::build::{TreeNode, build_tree_with};

/// One row of the pre-order display sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedItem {
    pub id: String,
    /// Parent of this row in the built forest. A promoted orphan
    /// ([`OrphanPolicy::Promote`]) is a root here, so this is `None` while
    /// `task.parent_id` still names the missing parent. Under
    /// [`OrphanPolicy::Drop`] the two always agree.
    pub parent_id: Option<String>,
    pub depth: usize,
    pub task: TaskNode,
    /// Number of transitive descendants (not just direct children)
    pub child_count: usize,
}

/// Flatten a forest into pre-order: every node is followed by its whole
/// subtree before its next sibling. Collapse state is not applied here.
pub fn flatten_tree(forest: &[TreeNode]) -> Vec<FlattenedItem> {
    let mut result = Vec::new();
    walk(forest, None, &mut result);
    result
}

/// Returns the number of rows emitted for `nodes` and their subtrees.
fn walk(nodes: &[TreeNode], parent_id: Option<&str>, result: &mut Vec<FlattenedItem>) -> usize {
    let mut emitted = 0;
    for node in nodes {
        let index = result.len();
        result.push(FlattenedItem {
            id: node.task.id.clone(),
            parent_id: parent_id.map(String::from),
            depth: node.depth,
            task: node.task.clone(),
            child_count: 0,
        });
        let descendants = walk(&node.children, Some(node.task.id.as_str()), result);
        result[index].child_count = descendants;
        emitted += 1 + descendants;
    }
    emitted
}

/// Drop every row hidden under a collapsed ancestor.
///
/// A collapsed row itself stays visible; only its descendants are hidden.
pub fn visible_items(flat: &[FlattenedItem], collapsed: &HashSet<String>) -> Vec<FlattenedItem> {
    let mut result = Vec::with_capacity(flat.len());
    let mut hidden_under: HashSet<&str> = HashSet::new();

    for item in flat {
        if let Some(parent) = item.parent_id.as_deref()
            && hidden_under.contains(parent)
        {
            hidden_under.insert(item.id.as_str());
            continue;
        }
        if collapsed.contains(&item.id) {
            hidden_under.insert(item.id.as_str());
        }
        result.push(item.clone());
    }
    result
}

/// A section's forest, its flattened rows and an id lookup, computed together
/// once per render pass.
#[derive(Debug, Clone)]
pub struct TaskTree {
    pub forest: Vec<TreeNode>,
    pub flat: Vec<FlattenedItem>,
    index: HashMap<String, usize>,
}

impl TaskTree {
    pub fn new(tasks: &[TaskNode], goal_id: &str, task_type: TaskType) -> Self {
        Self::with_policy(tasks, goal_id, task_type, OrphanPolicy::Drop)
    }

    pub fn with_policy(
        tasks: &[TaskNode],
        goal_id: &str,
        task_type: TaskType,
        orphans: OrphanPolicy,
    ) -> Self {
        let forest = build_tree_with(tasks, goal_id, task_type, orphans);
        let flat = flatten_tree(&forest);
        let index = flat
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        TaskTree {
            forest,
            flat,
            index,
        }
    }

    pub fn get(&self, task_id: &str) -> Option<&FlattenedItem> {
        self.index.get(task_id).map(|&i| &self.flat[i])
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Rows left after applying the collapsed set
    pub fn visible(&self, collapsed: &HashSet<String>) -> Vec<FlattenedItem> {
        visible_items(&self.flat, collapsed)
    }

    /// The first row carrying the magic wand, shown as the section banner
    pub fn wand_task(&self) -> Option<&TaskNode> {
        self.flat
            .iter()
            .find(|item| item.task.is_magic_wand)
            .map(|item| &item.task)
    }
}
