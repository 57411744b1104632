use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::task::TaskType;

/// Category of a one-off expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Lifestyle,
    Family,
    Misc,
    Opex,
    Capex,
    Gna,
}

impl ExpenseCategory {
    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Lifestyle => "Lifestyle",
            ExpenseCategory::Family => "Family",
            ExpenseCategory::Misc => "Misc",
            ExpenseCategory::Opex => "OPEX",
            ExpenseCategory::Capex => "CAPEX",
            ExpenseCategory::Gna => "G&A",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "food" => Ok(ExpenseCategory::Food),
            "lifestyle" => Ok(ExpenseCategory::Lifestyle),
            "family" => Ok(ExpenseCategory::Family),
            "misc" => Ok(ExpenseCategory::Misc),
            "opex" => Ok(ExpenseCategory::Opex),
            "capex" => Ok(ExpenseCategory::Capex),
            "gna" | "g&a" => Ok(ExpenseCategory::Gna),
            other => Err(format!("unknown expense category '{}'", other)),
        }
    }
}

/// Leaf category of a fixed (recurring) expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixedExpenseCategory {
    Housing,
    UtilitiesWaterElectric,
    UtilitiesGas,
    UtilitiesTelecom,
    Transport,
    Health,
    LiabilitiesDebt,
    LiabilitiesLoans,
    LiabilitiesInstallments,
    Taxes,
}

impl FixedExpenseCategory {
    pub fn label(self) -> &'static str {
        match self {
            FixedExpenseCategory::Housing => "Housing",
            FixedExpenseCategory::UtilitiesWaterElectric => "Water & Electric",
            FixedExpenseCategory::UtilitiesGas => "Gas",
            FixedExpenseCategory::UtilitiesTelecom => "Telecom",
            FixedExpenseCategory::Transport => "Transport",
            FixedExpenseCategory::Health => "Health",
            FixedExpenseCategory::LiabilitiesDebt => "Debt",
            FixedExpenseCategory::LiabilitiesLoans => "Loans",
            FixedExpenseCategory::LiabilitiesInstallments => "Installments",
            FixedExpenseCategory::Taxes => "Taxes",
        }
    }

    /// Grouping header for two-level listings, if any
    pub fn group(self) -> Option<&'static str> {
        match self {
            FixedExpenseCategory::UtilitiesWaterElectric
            | FixedExpenseCategory::UtilitiesGas
            | FixedExpenseCategory::UtilitiesTelecom => Some("Utilities"),
            FixedExpenseCategory::LiabilitiesDebt
            | FixedExpenseCategory::LiabilitiesLoans
            | FixedExpenseCategory::LiabilitiesInstallments => Some("Liabilities"),
            _ => None,
        }
    }

    /// Map a stored category name (including legacy names) onto the current
    /// set. Unknown or missing names fall back to housing.
    pub fn migrate(name: Option<&str>) -> FixedExpenseCategory {
        let Some(name) = name else {
            return FixedExpenseCategory::Housing;
        };
        match name {
            "utilities" => FixedExpenseCategory::UtilitiesWaterElectric,
            "transportation" => FixedExpenseCategory::Transport,
            "financial-obligations" => FixedExpenseCategory::LiabilitiesDebt,
            other => other.parse().unwrap_or(FixedExpenseCategory::Housing),
        }
    }
}

impl FromStr for FixedExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown fixed expense category '{}'", s))
    }
}

/// How often a fixed expense recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    BiWeekly,
    BiMonthly,
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl Frequency {
    /// Convert one payment into its monthly equivalent
    pub fn monthly_equivalent(self, amount: f64, custom_days: Option<u32>) -> f64 {
        match self {
            Frequency::Weekly => amount * 4.33,
            Frequency::BiWeekly => amount * 2.17,
            Frequency::BiMonthly => amount * 2.0,
            Frequency::Monthly => amount,
            Frequency::Quarterly => amount / 3.0,
            Frequency::Yearly => amount / 12.0,
            Frequency::Custom => match custom_days {
                Some(days) if days > 0 => amount * 30.0 / f64::from(days),
                _ => amount,
            },
        }
    }

    /// Days between two payments
    pub fn days(self, custom_days: Option<u32>) -> u32 {
        match self {
            Frequency::Weekly => 7,
            Frequency::BiWeekly => 14,
            Frequency::BiMonthly => 15,
            Frequency::Monthly => 30,
            Frequency::Quarterly => 90,
            Frequency::Yearly => 365,
            Frequency::Custom => custom_days.filter(|d| *d > 0).unwrap_or(30),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::BiMonthly => "bi-monthly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        };
        f.write_str(s)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
            .map_err(|_| format!("unknown frequency '{}'", s))
    }
}

/// A single recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub time_cost: String,
    #[serde(default)]
    pub needs_check: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    pub category: ExpenseCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_goal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_task_type: Option<TaskType>,
}

/// A recurring bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedExpense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default = "default_fixed_category", deserialize_with = "de_fixed_category")]
    pub category: FixedExpenseCategory,
}

impl FixedExpense {
    pub fn monthly_equivalent(&self) -> f64 {
        self.frequency.monthly_equivalent(self.amount, self.custom_days)
    }
}

fn default_true() -> bool {
    true
}

fn default_fixed_category() -> FixedExpenseCategory {
    FixedExpenseCategory::Housing
}

/// Accept legacy category names when reading stored records
fn de_fixed_category<'de, D>(deserializer: D) -> Result<FixedExpenseCategory, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(FixedExpenseCategory::migrate(raw.as_deref()))
}
