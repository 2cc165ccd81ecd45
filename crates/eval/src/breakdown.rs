//! Evaluation result -- the breakdown returned to the caller.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{ConfigError, Warning};

/// One matched rule and its (already rounded) contribution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchedRule {
    pub rule_id: u64,
    pub rule_name: String,
    pub group_name: String,
    pub amount: Decimal,
}

/// A rule that was evaluated against fully-resolvable fields and did
/// not match. Recorded for transparency only; never affects the total.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InactiveRule {
    pub rule_id: u64,
    pub rule_name: String,
    pub group_name: String,
}

/// Reference to the ruleset the breakdown was computed from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RulesetRef {
    pub id: u64,
    pub name: String,
}

/// The complete outcome of one evaluation call. Always returned --
/// runtime problems surface as `warnings` and `errors` entries, never
/// as an aborted evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub base_price: Decimal,
    /// Signed sum of matched rule amounts, deduction-positive.
    pub total_adjustment: Decimal,
    /// `max(0, base_price - total_adjustment)`.
    pub adjusted_price: Decimal,
    pub matched_rules: Vec<MatchedRule>,
    pub inactive_rules: Vec<InactiveRule>,
    pub warnings: Vec<Warning>,
    /// Per-rule structural defects (malformed condition grouping).
    pub errors: Vec<ConfigError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<RulesetRef>,
}

impl EvaluationResult {
    /// The no-ruleset outcome: base price unchanged, empty breakdown.
    pub fn unchanged(base_price: Decimal) -> Self {
        EvaluationResult {
            base_price,
            total_adjustment: Decimal::ZERO,
            adjusted_price: base_price.max(Decimal::ZERO),
            matched_rules: Vec::new(),
            inactive_rules: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            ruleset: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
