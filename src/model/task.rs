use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of the three per-goal forests a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Work that has to happen before the goal is reached
    Pre,
    /// Follow-up work after the goal is reached
    Post,
    /// Goals to pursue after this one (never completable)
    Dream,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Pre, TaskType::Post, TaskType::Dream];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Pre => "pre",
            TaskType::Post => "post",
            TaskType::Dream => "dream",
        }
    }

    /// Section heading used by the renderer
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Pre => "Pre-tasks",
            TaskType::Post => "Post-tasks",
            TaskType::Dream => "Post-Dreams",
        }
    }

    /// What the magic wand means in this section
    pub fn wand_label(self) -> &'static str {
        match self {
            TaskType::Pre | TaskType::Post => "Key Action",
            TaskType::Dream => "Dream Priority",
        }
    }

    pub fn is_completable(self) -> bool {
        self != TaskType::Dream
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre" => Ok(TaskType::Pre),
            "post" => Ok(TaskType::Post),
            "dream" => Ok(TaskType::Dream),
            other => Err(format!("unknown task type '{}' (expected pre, post or dream)", other)),
        }
    }
}

/// One task or dream record. The tree structure lives entirely in
/// `parent_id` + `sort_order`; nested views are rebuilt on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: String,
    pub goal_id: String,
    /// Parent within the same `(goal_id, task_type)` partition, `None` for roots
    pub parent_id: Option<String>,
    pub task_type: TaskType,
    /// Relative order among siblings; only the ordering matters
    pub sort_order: i64,
    pub title: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub time_cost: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub is_magic_wand: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_expense_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl TaskNode {
    /// Create a bare task with default leaf attributes
    pub fn new(
        id: impl Into<String>,
        goal_id: impl Into<String>,
        parent_id: Option<String>,
        task_type: TaskType,
        sort_order: i64,
        title: impl Into<String>,
    ) -> Self {
        TaskNode {
            id: id.into(),
            goal_id: goal_id.into(),
            parent_id,
            task_type,
            sort_order,
            title: title.into(),
            cost: 0.0,
            time_cost: String::new(),
            deadline: String::new(),
            is_magic_wand: false,
            completed: false,
            linked_expense_id: None,
            created_at: String::new(),
        }
    }

    /// True if this task lives in the given goal/type partition
    pub fn in_section(&self, goal_id: &str, task_type: TaskType) -> bool {
        self.goal_id == goal_id && self.task_type == task_type
    }

    /// True if `other` is in the same sibling group as this task
    pub fn is_sibling_of(&self, other: &TaskNode) -> bool {
        self.goal_id == other.goal_id
            && self.task_type == other.task_type
            && self.parent_id == other.parent_id
    }
}

/// Fields supplied when creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub cost: f64,
    pub time_cost: String,
    pub deadline: String,
}

/// Partial update of a task's leaf attributes
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub cost: Option<f64>,
    pub time_cost: Option<String>,
    pub deadline: Option<String>,
    /// `Some(None)` clears the link
    pub linked_expense_id: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.cost.is_none()
            && self.time_cost.is_none()
            && self.deadline.is_none()
            && self.linked_expense_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_type_parses_case_insensitively() {
        assert_eq!("PRE".parse::<TaskType>().unwrap(), TaskType::Pre);
        assert_eq!("dream".parse::<TaskType>().unwrap(), TaskType::Dream);
        assert!("later".parse::<TaskType>().is_err());
    }

    #[test]
    fn dreams_are_not_completable() {
        assert!(TaskType::Pre.is_completable());
        assert!(TaskType::Post.is_completable());
        assert!(!TaskType::Dream.is_completable());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let task = TaskNode::new("T-001", "G-001", None, TaskType::Pre, 0, "Book flights");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["goalId"], "G-001");
        assert_eq!(json["parentId"], serde_json::Value::Null);
        assert_eq!(json["taskType"], "pre");
        assert_eq!(json["sortOrder"], 0);
        assert!(json.get("linkedExpenseId").is_none());
    }

    #[test]
    fn deserializes_minimal_record() {
        let task: TaskNode = serde_json::from_str(
            r#"{"id":"1","goalId":"g","parentId":null,"taskType":"post","sortOrder":3,"title":"x"}"#,
        )
        .unwrap();
        assert_eq!(task.task_type, TaskType::Post);
        assert_eq!(task.sort_order, 3);
        assert_eq!(task.cost, 0.0);
        assert!(!task.is_magic_wand);
    }

    #[test]
    fn sibling_requires_same_partition_and_parent() {
        let a = TaskNode::new("1", "g", Some("p".into()), TaskType::Pre, 0, "a");
        let b = TaskNode::new("2", "g", Some("p".into()), TaskType::Pre, 1, "b");
        let c = TaskNode::new("3", "g", Some("p".into()), TaskType::Post, 0, "c");
        assert!(a.is_sibling_of(&b));
        assert!(!a.is_sibling_of(&c));
    }
}
