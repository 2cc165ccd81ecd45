//! Action execution.
//!
//! `execute` turns one action into a signed amount (deduction-positive).
//! Nothing here aborts: missing metrics, formula failures, and zero
//! benchmarks all yield a 0 amount plus a warning message, which the
//! orchestrator attaches to the rule being evaluated.
//!
//! Rounding policy: the base amount is rounded to two decimal places
//! before multipliers apply, and the multiplied result is rounded again,
//! so the per-rule amount shown in the breakdown is exactly the amount
//! summed into the total.

use rust_decimal::{Decimal, RoundingStrategy};

use appraise_core::{evaluate, parse};

use crate::condition::values_equal;
use crate::context::EvaluationContext;
use crate::types::{Action, Multiplier};

/// One executed action: the rounded amount plus any non-fatal findings.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub amount: Decimal,
    pub warnings: Vec<String>,
}

pub fn execute(action: &Action, ctx: &EvaluationContext) -> ActionOutcome {
    let mut warnings = Vec::new();
    let base = base_amount(action, ctx, &mut warnings);
    let base = round2(base);
    let factor = multiplier_factor(action.multipliers(), ctx);
    ActionOutcome {
        amount: round2(base * factor),
        warnings,
    }
}

fn base_amount(action: &Action, ctx: &EvaluationContext, warnings: &mut Vec<String>) -> Decimal {
    match action {
        Action::FixedValue { value_usd, .. } => *value_usd,
        Action::PerUnit {
            metric, value_usd, ..
        } => match ctx.number(metric) {
            Some(units) => *value_usd * units,
            None => {
                warnings.push(format!(
                    "per_unit action: no numeric value for metric '{}'",
                    metric
                ));
                Decimal::ZERO
            }
        },
        Action::Formula {
            formula, value_usd, ..
        } => {
            let expr = match parse(formula) {
                Ok(expr) => expr,
                Err(e) => {
                    warnings.push(format!("formula action failed to parse: {}", e));
                    return Decimal::ZERO;
                }
            };
            match evaluate(&expr, ctx) {
                Ok(result) => result * *value_usd,
                Err(e) => {
                    warnings.push(format!("formula action failed: {}", e));
                    Decimal::ZERO
                }
            }
        }
        Action::BenchmarkBased {
            metric,
            benchmark,
            value_usd,
            ..
        } => {
            let metric_val = match ctx.number(metric) {
                Some(v) => v,
                None => {
                    warnings.push(format!(
                        "benchmark_based action: no numeric value for metric '{}'",
                        metric
                    ));
                    return Decimal::ZERO;
                }
            };
            let benchmark_val = match ctx.number(benchmark) {
                Some(v) if !v.is_zero() => v,
                Some(_) => {
                    warnings.push(format!(
                        "benchmark_based action: benchmark '{}' is zero",
                        benchmark
                    ));
                    return Decimal::ZERO;
                }
                None => {
                    warnings.push(format!(
                        "benchmark_based action: no numeric value for benchmark '{}'",
                        benchmark
                    ));
                    return Decimal::ZERO;
                }
            };
            *value_usd * (metric_val / benchmark_val)
        }
    }
}

/// Compose every multiplier definition multiplicatively. A definition
/// whose field is missing or matches no case contributes identity 1.0
/// -- multipliers scale actions, they never veto them.
fn multiplier_factor(multipliers: &[Multiplier], ctx: &EvaluationContext) -> Decimal {
    let mut factor = Decimal::ONE;
    for def in multipliers {
        factor *= resolve_multiplier(def, ctx);
    }
    factor
}

fn resolve_multiplier(def: &Multiplier, ctx: &EvaluationContext) -> Decimal {
    let resolved = match ctx.get(&def.field_path) {
        Some(v) => v,
        None => return Decimal::ONE,
    };
    def.conditions
        .iter()
        .find(|case| values_equal(resolved, &case.match_value))
        .map(|case| case.multiplier)
        .unwrap_or(Decimal::ONE)
}

/// Round to two decimal places (banker's rounding) and pin the scale,
/// so amounts serialize uniformly as e.g. "40.00".
pub fn round2(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}
