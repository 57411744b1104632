use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;

use crate::model::task::TaskNode;

/// All transitive descendants of `task_id`, in breadth-first order.
///
/// Follows `parent_id` links over the whole collection regardless of goal or
/// type. Each node is visited once, so corrupt data containing a cycle still
/// terminates; the start node is never reported as its own descendant.
pub fn descendant_ids(tasks: &[TaskNode], task_id: &str) -> IndexSet<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        if let Some(parent) = task.parent_id.as_deref() {
            children.entry(parent).or_default().push(task.id.as_str());
        }
    }

    let mut found = IndexSet::new();
    let mut queue = VecDeque::from([task_id]);
    while let Some(current) = queue.pop_front() {
        let Some(kids) = children.get(current) else {
            continue;
        };
        for &kid in kids {
            if kid == task_id || !found.insert(kid.to_string()) {
                continue;
            }
            queue.push_back(kid);
        }
    }
    found
}

/// True if `candidate` sits somewhere below `ancestor`
pub fn is_descendant(tasks: &[TaskNode], ancestor: &str, candidate: &str) -> bool {
    descendant_ids(tasks, ancestor).contains(candidate)
}
