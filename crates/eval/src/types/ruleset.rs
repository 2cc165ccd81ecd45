//! Ruleset, rule group, and rule snapshots.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::action::Action;
use super::condition::Condition;

fn active() -> bool {
    true
}

/// A versioned, prioritized collection of rule groups. Lower `priority`
/// wins during automatic selection.
#[derive(Debug, Clone, Deserialize)]
pub struct Ruleset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    /// Condition rows deciding whether this ruleset auto-applies to a
    /// listing. Empty means static assignment only.
    #[serde(default)]
    pub selection_conditions: Vec<Condition>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

/// A weighted, named bucket of rules (e.g. "RAM", "Storage"). The
/// weight feeds composite scoring outside this engine and is carried
/// through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub weight: Decimal,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A condition tree plus an ordered list of actions.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub evaluation_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
}
