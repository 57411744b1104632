use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ledger::Ledger;
use crate::model::task::TaskType;

const STATE_FILE: &str = ".state.json";

/// View state kept next to the ledger (written to .state.json). Losing it
/// only expands every row again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Collapsed task IDs per `goal_id/task_type` section
    #[serde(default)]
    pub collapsed: BTreeMap<String, BTreeSet<String>>,
}

fn section_key(goal_id: &str, task_type: TaskType) -> String {
    format!("{}/{}", goal_id, task_type)
}

impl ViewState {
    /// Collapsed IDs of one section, in the shape `visible_items` takes
    pub fn collapsed_in(&self, goal_id: &str, task_type: TaskType) -> HashSet<String> {
        self.collapsed
            .get(&section_key(goal_id, task_type))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_collapsed(&self, goal_id: &str, task_type: TaskType, task_id: &str) -> bool {
        self.collapsed
            .get(&section_key(goal_id, task_type))
            .is_some_and(|ids| ids.contains(task_id))
    }

    pub fn set_collapsed(&mut self, goal_id: &str, task_type: TaskType, task_id: &str, collapsed: bool) {
        let key = section_key(goal_id, task_type);
        if collapsed {
            self.collapsed.entry(key).or_default().insert(task_id.to_string());
        } else if let Some(ids) = self.collapsed.get_mut(&key) {
            ids.remove(task_id);
            if ids.is_empty() {
                self.collapsed.remove(&key);
            }
        }
    }

    /// Flip one row. Returns true if it is now collapsed.
    pub fn toggle(&mut self, goal_id: &str, task_type: TaskType, task_id: &str) -> bool {
        let now = !self.is_collapsed(goal_id, task_type, task_id);
        self.set_collapsed(goal_id, task_type, task_id, now);
        now
    }

    /// Forget IDs that no longer name a task of their section.
    pub fn prune(&mut self, ledger: &Ledger) {
        let live: HashSet<String> = ledger
            .tasks
            .iter()
            .map(|t| section_key(&t.goal_id, t.task_type) + "|" + &t.id)
            .collect();
        for (key, ids) in self.collapsed.iter_mut() {
            ids.retain(|id| live.contains(&format!("{}|{}", key, id)));
        }
        self.collapsed.retain(|_, ids| !ids.is_empty());
    }
}

/// Read .state.json from the goalpost directory
pub fn read_view_state(dir: &Path) -> Option<ViewState> {
    let path = dir.join(STATE_FILE);
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the goalpost directory
pub fn write_view_state(dir: &Path, state: &ViewState) -> Result<(), std::io::Error> {
    let path = dir.join(STATE_FILE);
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
