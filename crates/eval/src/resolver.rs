//! Ruleset selection and the top-level evaluation entry point.

use rust_decimal::Decimal;

use crate::breakdown::EvaluationResult;
use crate::condition::eval_tree;
use crate::context::EvaluationContext;
use crate::orchestrator::{evaluate_ruleset, ListingOverrides};
use crate::types::{ConditionTree, Ruleset};

/// Select the ruleset applying to a listing.
///
/// A static assignment wins when the id is known. Otherwise every
/// active ruleset's selection conditions are evaluated; among matches
/// the lowest `priority` wins, ties broken by ascending id. Rulesets
/// with no selection conditions, or with malformed grouping, are never
/// auto-selected.
pub fn select_ruleset<'a>(
    ctx: &EvaluationContext,
    static_ruleset_id: Option<u64>,
    rulesets: &'a [Ruleset],
) -> Option<&'a Ruleset> {
    if let Some(id) = static_ruleset_id {
        if let Some(assigned) = rulesets.iter().find(|rs| rs.id == id) {
            return Some(assigned);
        }
        // Unknown static id: fall through to condition-based selection
    }

    let mut best: Option<&Ruleset> = None;
    for candidate in rulesets.iter().filter(|rs| rs.is_active) {
        let tree = match ConditionTree::build(&candidate.selection_conditions) {
            Ok(Some(tree)) => tree,
            // No conditions or malformed grouping: not auto-selectable
            Ok(None) | Err(_) => continue,
        };
        if !eval_tree(&tree, ctx).matched {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => {
                (candidate.priority, candidate.id) < (current.priority, current.id)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Evaluate a listing end to end: select the applicable ruleset and run
/// it. No applicable ruleset returns the base price unchanged with an
/// empty breakdown -- not an error.
pub fn appraise(
    ctx: &EvaluationContext,
    base_price: Decimal,
    rulesets: &[Ruleset],
    static_ruleset_id: Option<u64>,
    overrides: &ListingOverrides,
) -> EvaluationResult {
    match select_ruleset(ctx, static_ruleset_id, rulesets) {
        Some(ruleset) => evaluate_ruleset(ruleset, ctx, base_price, overrides),
        None => EvaluationResult::unchanged(base_price),
    }
}
