use serde::{Deserialize, Serialize};

/// A free-form idea captured against a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ideation {
    pub id: String,
    pub content: String,
    pub created_at: String,
}

/// A goal owning three task forests (pre, post, dream)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub completed: bool,
    /// At most one goal carries the wand (the current top priority)
    #[serde(default)]
    pub is_magic_wand: bool,
    #[serde(default)]
    pub created_at: String,
    /// Savings earmarked for this goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_expense_id: Option<String>,
    #[serde(default)]
    pub ideations: Vec<Ideation>,
    #[serde(default)]
    pub constraint: String,
    #[serde(default)]
    pub url_pack: Vec<String>,
}

impl Goal {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Goal {
            id: id.into(),
            title: title.into(),
            deadline: String::new(),
            completed: false,
            is_magic_wand: false,
            created_at: String::new(),
            budget: None,
            linked_expense_id: None,
            ideations: Vec::new(),
            constraint: String::new(),
            url_pack: Vec::new(),
        }
    }

    /// Active goals take part in budget allocation
    pub fn is_active(&self) -> bool {
        !self.completed && !self.title.trim().is_empty()
    }
}
