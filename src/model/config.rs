use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration from goalpost.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub ledger: LedgerInfo,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Horizontal pixels per depth level when projecting a drag
    #[serde(default = "default_indent_width")]
    pub indent_width: u32,
    /// What to do with tasks whose parent no longer exists
    #[serde(default)]
    pub orphans: OrphanPolicy,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            indent_width: default_indent_width(),
            orphans: OrphanPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Prefix printed before amounts
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            currency: default_currency(),
        }
    }
}

fn default_indent_width() -> u32 {
    24
}

fn default_currency() -> String {
    "$".to_string()
}

/// Handling of tasks whose `parent_id` does not resolve inside their section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Leave the orphan (and its subtree) out of the built forest
    #[default]
    Drop,
    /// Show the orphan as an extra root after the real roots
    Promote,
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanPolicy::Drop => f.write_str("drop"),
            OrphanPolicy::Promote => f.write_str("promote"),
        }
    }
}

impl FromStr for OrphanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(OrphanPolicy::Drop),
            "promote" => Ok(OrphanPolicy::Promote),
            other => Err(format!("unknown orphan policy '{}' (expected drop or promote)", other)),
        }
    }
}
