//! Condition tree evaluation.
//!
//! Leaf predicates resolve their field path against the context. A
//! missing value matches only `is_null`; every other operator fails
//! quietly -- condition evaluation never raises. Type mismatches at
//! runtime (e.g. `gt` against a text value) also fail quietly; keeping
//! operators and field types consistent is the authoring checker's job.

use crate::context::{EvaluationContext, Value};
use crate::types::{Condition, ConditionTree, LogicalOp, Operator};

/// Match decision plus the leaves that evaluated true, kept for the
/// breakdown's audit trail.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matched: bool,
    pub contributing: Vec<Condition>,
}

pub fn eval_tree(tree: &ConditionTree, ctx: &EvaluationContext) -> MatchOutcome {
    let mut contributing = Vec::new();
    let matched = eval_node(tree, ctx, &mut contributing);
    MatchOutcome {
        matched,
        contributing,
    }
}

fn eval_node(tree: &ConditionTree, ctx: &EvaluationContext, contributing: &mut Vec<Condition>) -> bool {
    match tree {
        ConditionTree::Leaf(cond) => {
            let result = eval_leaf(cond, ctx);
            if result {
                contributing.push(cond.clone());
            }
            result
        }
        ConditionTree::Group {
            op,
            negated,
            children,
        } => {
            let mut result = match op {
                LogicalOp::And => true,
                LogicalOp::Or => false,
            };
            // No short-circuit: every contributing leaf is recorded even
            // when an OR already succeeded.
            for child in children {
                let child_result = eval_node(child, ctx, contributing);
                result = match op {
                    LogicalOp::And => result && child_result,
                    LogicalOp::Or => result || child_result,
                };
            }
            if *negated {
                !result
            } else {
                result
            }
        }
    }
}

/// Evaluate one leaf predicate. The `negated` flag inverts the result.
pub fn eval_leaf(cond: &Condition, ctx: &EvaluationContext) -> bool {
    let resolved = ctx.get(&cond.field_path);
    let raw = match (resolved, cond.operator) {
        (None, Operator::IsNull) => true,
        (None, _) => false,
        (Some(_), Operator::IsNull) => false,
        (Some(_), Operator::IsNotNull) => true,
        (Some(value), op) => compare(value, op, &cond.value),
    };
    if cond.negated {
        !raw
    } else {
        raw
    }
}

fn compare(resolved: &Value, op: Operator, expected: &serde_json::Value) -> bool {
    match op {
        Operator::Eq => values_equal(resolved, expected),
        Operator::Neq => !values_equal(resolved, expected),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            let lhs = match resolved.as_number() {
                Some(n) => n,
                None => return false,
            };
            let rhs = match Value::from_json(expected).and_then(|v| v.as_number()) {
                Some(n) => n,
                None => return false,
            };
            match op {
                Operator::Gt => lhs > rhs,
                Operator::Gte => lhs >= rhs,
                Operator::Lt => lhs < rhs,
                Operator::Lte => lhs <= rhs,
                _ => unreachable!(),
            }
        }
        Operator::Contains => match (resolved, expected) {
            (Value::Text(haystack), serde_json::Value::String(needle)) => {
                haystack.contains(needle.as_str())
            }
            (Value::List(items), _) => items.iter().any(|item| values_equal(item, expected)),
            _ => false,
        },
        Operator::In => match expected {
            serde_json::Value::Array(options) => {
                options.iter().any(|opt| values_equal(resolved, opt))
            }
            _ => false,
        },
        // Handled by eval_leaf before comparison
        Operator::IsNull | Operator::IsNotNull => false,
    }
}

/// Equality between a context value and an authored JSON literal.
/// Numbers compare by numeric value, so `16` equals `16.0`.
pub fn values_equal(resolved: &Value, expected: &serde_json::Value) -> bool {
    match Value::from_json(expected) {
        Some(Value::Number(rhs)) => resolved.as_number() == Some(rhs),
        Some(other) => *resolved == other,
        None => false,
    }
}
