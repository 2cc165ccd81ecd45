//! Action definitions.
//!
//! An action computes one signed adjustment amount (deduction-positive).
//! The wire format tags each action with `action_type`; deserialization
//! resolves it into an explicit variant so the executor never inspects
//! raw JSON.

use rust_decimal::Decimal;
use serde::Deserialize;

use appraise_core::FieldPath;

fn one() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum Action {
    /// A flat amount, independent of the context.
    FixedValue {
        value_usd: Decimal,
        #[serde(default)]
        multipliers: Vec<Multiplier>,
    },
    /// `value_usd` per unit of the metric field.
    PerUnit {
        metric: FieldPath,
        value_usd: Decimal,
        #[serde(default)]
        multipliers: Vec<Multiplier>,
    },
    /// A formula over the context, scaled by `value_usd`. Authoring a
    /// negative `value_usd` turns a positive formula into a price
    /// addition (negative deduction).
    Formula {
        formula: String,
        #[serde(default = "one")]
        value_usd: Decimal,
        #[serde(default)]
        multipliers: Vec<Multiplier>,
    },
    /// `value_usd` scaled by the ratio `metric / benchmark`.
    BenchmarkBased {
        metric: FieldPath,
        benchmark: FieldPath,
        value_usd: Decimal,
        #[serde(default)]
        multipliers: Vec<Multiplier>,
    },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::FixedValue { .. } => "fixed_value",
            Action::PerUnit { .. } => "per_unit",
            Action::Formula { .. } => "formula",
            Action::BenchmarkBased { .. } => "benchmark_based",
        }
    }

    pub fn multipliers(&self) -> &[Multiplier] {
        match self {
            Action::FixedValue { multipliers, .. }
            | Action::PerUnit { multipliers, .. }
            | Action::Formula { multipliers, .. }
            | Action::BenchmarkBased { multipliers, .. } => multipliers,
        }
    }
}

/// A conditional scaling factor keyed on a context field value. The
/// first case whose `match_value` equals the resolved value wins; no
/// match contributes identity 1.0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Multiplier {
    pub field_path: FieldPath,
    pub conditions: Vec<MultiplierCase>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiplierCase {
    pub match_value: serde_json::Value,
    pub multiplier: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn deserializes_tagged_variants() {
        let a: Action = serde_json::from_value(serde_json::json!({
            "action_type": "per_unit",
            "metric": "ram_gb",
            "value_usd": "2.5"
        }))
        .unwrap();
        match a {
            Action::PerUnit { metric, value_usd, multipliers } => {
                assert_eq!(metric.to_string(), "ram_gb");
                assert_eq!(value_usd, Decimal::from_str("2.5").unwrap());
                assert!(multipliers.is_empty());
            }
            other => panic!("expected per_unit, got {:?}", other),
        }
    }

    #[test]
    fn formula_value_usd_defaults_to_one() {
        let a: Action = serde_json::from_value(serde_json::json!({
            "action_type": "formula",
            "formula": "2.0 * ram_gb"
        }))
        .unwrap();
        match a {
            Action::Formula { value_usd, .. } => assert_eq!(value_usd, Decimal::ONE),
            other => panic!("expected formula, got {:?}", other),
        }
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let r: Result<Action, _> = serde_json::from_value(serde_json::json!({
            "action_type": "percentage",
            "value_usd": "1"
        }));
        assert!(r.is_err());
    }

    #[test]
    fn multiplier_with_cases() {
        let m: Multiplier = serde_json::from_value(serde_json::json!({
            "field_path": "ram_spec.ddr_generation",
            "conditions": [
                { "match_value": "ddr3", "multiplier": "0.7" },
                { "match_value": "ddr4", "multiplier": "1.0" },
                { "match_value": "ddr5", "multiplier": "1.3" }
            ]
        }))
        .unwrap();
        assert_eq!(m.conditions.len(), 3);
        assert_eq!(m.conditions[2].multiplier, Decimal::from_str("1.3").unwrap());
    }
}
