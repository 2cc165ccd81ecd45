//! Rule model and engine error types.
//!
//! Rules arrive as read-only snapshots serialized by the rule-authoring
//! collaborator. They are deserialized once into typed structures here
//! -- tagged action variants, grouped condition trees -- so that no
//! structural interpretation happens mid-evaluation.

pub mod action;
pub mod condition;
pub mod ruleset;

use serde::Serialize;
use std::fmt;

pub use action::{Action, Multiplier, MultiplierCase};
pub use condition::{Condition, ConditionTree, LogicalOp, Operator};
pub use ruleset::{Rule, RuleGroup, Ruleset};

// ──────────────────────────────────────────────
// Errors and warnings
// ──────────────────────────────────────────────

/// Non-fatal finding produced while evaluating one rule. The rule
/// contributes 0 and evaluation of the ruleset continues.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Warning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn for_rule(rule_id: u64, rule_name: &str, message: impl Into<String>) -> Self {
        Warning {
            rule_id: Some(rule_id),
            rule_name: Some(rule_name.to_string()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Warning {
            rule_id: None,
            rule_name: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule_name {
            Some(name) => write!(f, "rule '{}': {}", name, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A structural defect in a rule definition -- malformed condition
/// grouping. Fatal for that one rule only: it is excluded from both
/// matched and inactive lists, and the rest of the ruleset proceeds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigError {
    pub rule_id: u64,
    pub rule_name: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule '{}' misconfigured: {}", self.rule_name, self.message)
    }
}
