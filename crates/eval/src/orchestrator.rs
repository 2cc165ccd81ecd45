//! Ruleset evaluation -- iterates groups and rules, aggregates amounts.
//!
//! Partial-failure tolerance is the contract here: a bad formula, a
//! missing field, or a malformed condition grouping costs that one rule
//! its contribution (with a warning or error entry) and nothing else.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;

use crate::action;
use crate::breakdown::{EvaluationResult, InactiveRule, MatchedRule, RulesetRef};
use crate::condition::eval_tree;
use crate::context::EvaluationContext;
use crate::types::{ConditionTree, ConfigError, Rule, RuleGroup, Ruleset, Warning};

/// Per-listing disable lists supplied by the override collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingOverrides {
    #[serde(default)]
    pub disabled_groups: BTreeSet<u64>,
    #[serde(default)]
    pub disabled_rules: BTreeSet<u64>,
}

impl ListingOverrides {
    pub fn none() -> Self {
        ListingOverrides::default()
    }
}

/// Evaluate one ruleset against a listing context.
pub fn evaluate_ruleset(
    ruleset: &Ruleset,
    ctx: &EvaluationContext,
    base_price: Decimal,
    overrides: &ListingOverrides,
) -> EvaluationResult {
    let mut result = EvaluationResult::unchanged(base_price);
    result.ruleset = Some(RulesetRef {
        id: ruleset.id,
        name: ruleset.name.clone(),
    });

    let mut groups: Vec<&RuleGroup> = ruleset
        .groups
        .iter()
        .filter(|g| g.is_active && !overrides.disabled_groups.contains(&g.id))
        .collect();
    groups.sort_by_key(|g| g.display_order);

    for group in groups {
        let mut rules: Vec<&Rule> = group
            .rules
            .iter()
            .filter(|r| r.is_active && !overrides.disabled_rules.contains(&r.id))
            .collect();
        rules.sort_by_key(|r| (r.priority, r.evaluation_order));

        for rule in rules {
            eval_rule(rule, &group.name, ctx, &mut result);
        }
    }

    result.total_adjustment = result.matched_rules.iter().map(|m| m.amount).sum();
    result.adjusted_price = (base_price - result.total_adjustment).max(Decimal::ZERO);
    result
}

fn eval_rule(rule: &Rule, group_name: &str, ctx: &EvaluationContext, result: &mut EvaluationResult) {
    let tree = match ConditionTree::build(&rule.conditions) {
        Ok(tree) => tree,
        Err(message) => {
            result.errors.push(ConfigError {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                message,
            });
            return;
        }
    };

    // A rule with no conditions always applies.
    let matched = match &tree {
        Some(tree) => eval_tree(tree, ctx).matched,
        None => true,
    };

    if !matched {
        // Record for transparency only when the non-match is meaningful,
        // i.e. every referenced field actually resolved.
        let resolvable = tree
            .as_ref()
            .map(|t| t.leaves().iter().all(|c| ctx.resolves(&c.field_path)))
            .unwrap_or(true);
        if resolvable {
            result.inactive_rules.push(InactiveRule {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                group_name: group_name.to_string(),
            });
        }
        return;
    }

    let mut amount = Decimal::ZERO;
    for act in &rule.actions {
        let outcome = action::execute(act, ctx);
        amount += outcome.amount;
        for message in outcome.warnings {
            result
                .warnings
                .push(Warning::for_rule(rule.id, &rule.name, message));
        }
    }

    result.matched_rules.push(MatchedRule {
        rule_id: rule.id,
        rule_name: rule.name.clone(),
        group_name: group_name.to_string(),
        amount,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ctx() -> EvaluationContext {
        EvaluationContext::from_json(&serde_json::json!({
            "ram_gb": 16,
            "ram_spec": { "ddr_generation": "ddr4" }
        }))
    }

    fn ruleset() -> Ruleset {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Desktops",
            "groups": [
                {
                    "id": 10,
                    "name": "RAM",
                    "display_order": 1,
                    "rules": [
                        {
                            "id": 100,
                            "name": "RAM deduction",
                            "conditions": [{
                                "field_path": "ram_gb",
                                "field_type": "number",
                                "operator": "gte",
                                "value": 1
                            }],
                            "actions": [{
                                "action_type": "per_unit",
                                "metric": "ram_gb",
                                "value_usd": "2.5"
                            }]
                        },
                        {
                            "id": 101,
                            "name": "Huge RAM",
                            "conditions": [{
                                "field_path": "ram_gb",
                                "field_type": "number",
                                "operator": "gte",
                                "value": 128
                            }],
                            "actions": [{ "action_type": "fixed_value", "value_usd": "100" }]
                        }
                    ]
                },
                {
                    "id": 20,
                    "name": "Disabled group",
                    "display_order": 2,
                    "is_active": false,
                    "rules": [{
                        "id": 200,
                        "name": "Should never run",
                        "actions": [{ "action_type": "fixed_value", "value_usd": "1000" }]
                    }]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn matched_and_inactive_split() {
        let result = evaluate_ruleset(&ruleset(), &ctx(), dec("500"), &ListingOverrides::none());
        assert_eq!(result.matched_rules.len(), 1);
        assert_eq!(result.matched_rules[0].rule_name, "RAM deduction");
        assert_eq!(result.matched_rules[0].amount, dec("40.00"));
        assert_eq!(result.inactive_rules.len(), 1);
        assert_eq!(result.inactive_rules[0].rule_name, "Huge RAM");
        assert_eq!(result.total_adjustment, dec("40.00"));
        assert_eq!(result.adjusted_price, dec("460.00"));
        assert!(result.warnings.is_empty());
        assert_eq!(result.ruleset.as_ref().map(|r| r.id), Some(1));
    }

    #[test]
    fn inactive_group_is_skipped() {
        let result = evaluate_ruleset(&ruleset(), &ctx(), dec("500"), &ListingOverrides::none());
        assert!(result
            .matched_rules
            .iter()
            .all(|m| m.group_name != "Disabled group"));
    }

    #[test]
    fn listing_overrides_disable_rules_and_groups() {
        let mut overrides = ListingOverrides::none();
        overrides.disabled_rules.insert(100);
        let result = evaluate_ruleset(&ruleset(), &ctx(), dec("500"), &overrides);
        assert!(result.matched_rules.is_empty());
        assert_eq!(result.adjusted_price, dec("500"));

        let mut overrides = ListingOverrides::none();
        overrides.disabled_groups.insert(10);
        let result = evaluate_ruleset(&ruleset(), &ctx(), dec("500"), &overrides);
        assert!(result.matched_rules.is_empty());
    }

    #[test]
    fn unresolvable_non_match_stays_out_of_inactive() {
        let ruleset: Ruleset = serde_json::from_value(serde_json::json!({
            "id": 2,
            "name": "GPU rules",
            "groups": [{
                "id": 30,
                "name": "GPU",
                "rules": [{
                    "id": 300,
                    "name": "VRAM deduction",
                    "conditions": [{
                        "field_path": "gpu_spec.vram_gb",
                        "field_type": "number",
                        "operator": "gte",
                        "value": 8
                    }],
                    "actions": [{ "action_type": "fixed_value", "value_usd": "50" }]
                }]
            }]
        }))
        .unwrap();
        let result = evaluate_ruleset(&ruleset, &ctx(), dec("500"), &ListingOverrides::none());
        assert!(result.matched_rules.is_empty());
        assert!(result.inactive_rules.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn malformed_grouping_is_an_error_entry_only() {
        let ruleset: Ruleset = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Broken",
            "groups": [{
                "id": 40,
                "name": "Mixed",
                "rules": [
                    {
                        "id": 400,
                        "name": "Bad grouping",
                        "conditions": [{
                            "field_path": "ram_gb",
                            "field_type": "number",
                            "operator": "gte",
                            "value": 1,
                            "group_order": 4
                        }],
                        "actions": [{ "action_type": "fixed_value", "value_usd": "10" }]
                    },
                    {
                        "id": 401,
                        "name": "Still runs",
                        "actions": [{ "action_type": "fixed_value", "value_usd": "5" }]
                    }
                ]
            }]
        }))
        .unwrap();
        let result = evaluate_ruleset(&ruleset, &ctx(), dec("100"), &ListingOverrides::none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].rule_id, 400);
        assert!(result.matched_rules.iter().all(|m| m.rule_id != 400));
        assert!(result.inactive_rules.iter().all(|m| m.rule_id != 400));
        // The rest of the ruleset still evaluated
        assert_eq!(result.matched_rules.len(), 1);
        assert_eq!(result.total_adjustment, dec("5.00"));
    }

    #[test]
    fn adjusted_price_floors_at_zero() {
        let ruleset: Ruleset = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Aggressive",
            "groups": [{
                "id": 50,
                "name": "All",
                "rules": [{
                    "id": 500,
                    "name": "Big deduction",
                    "actions": [{ "action_type": "fixed_value", "value_usd": "900" }]
                }]
            }]
        }))
        .unwrap();
        let result = evaluate_ruleset(&ruleset, &ctx(), dec("500"), &ListingOverrides::none());
        assert_eq!(result.total_adjustment, dec("900.00"));
        assert_eq!(result.adjusted_price, Decimal::ZERO);
    }

    #[test]
    fn rule_failure_does_not_stop_the_run() {
        let ruleset: Ruleset = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Partial",
            "groups": [{
                "id": 60,
                "name": "Mixed",
                "rules": [
                    {
                        "id": 600,
                        "name": "Bad formula",
                        "priority": 0,
                        "actions": [{ "action_type": "formula", "formula": "nope_field * 2" }]
                    },
                    {
                        "id": 601,
                        "name": "Good rule",
                        "priority": 1,
                        "actions": [{ "action_type": "fixed_value", "value_usd": "25" }]
                    }
                ]
            }]
        }))
        .unwrap();
        let result = evaluate_ruleset(&ruleset, &ctx(), dec("500"), &ListingOverrides::none());
        // Bad formula rule matched (no conditions) but contributed 0
        assert_eq!(result.matched_rules.len(), 2);
        assert_eq!(result.matched_rules[0].amount, Decimal::ZERO);
        assert_eq!(result.total_adjustment, dec("25.00"));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].rule_id, Some(600));
    }

    #[test]
    fn rules_ordered_by_priority_then_evaluation_order() {
        let ruleset: Ruleset = serde_json::from_value(serde_json::json!({
            "id": 6,
            "name": "Ordering",
            "groups": [{
                "id": 70,
                "name": "G",
                "rules": [
                    { "id": 700, "name": "c", "priority": 2, "evaluation_order": 0,
                      "actions": [{ "action_type": "fixed_value", "value_usd": "1" }] },
                    { "id": 701, "name": "a", "priority": 1, "evaluation_order": 1,
                      "actions": [{ "action_type": "fixed_value", "value_usd": "1" }] },
                    { "id": 702, "name": "b", "priority": 1, "evaluation_order": 2,
                      "actions": [{ "action_type": "fixed_value", "value_usd": "1" }] }
                ]
            }]
        }))
        .unwrap();
        let result = evaluate_ruleset(&ruleset, &ctx(), dec("500"), &ListingOverrides::none());
        let names: Vec<&str> = result.matched_rules.iter().map(|m| m.rule_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn idempotent_evaluation() {
        let rs = ruleset();
        let first = evaluate_ruleset(&rs, &ctx(), dec("500"), &ListingOverrides::none());
        let second = evaluate_ruleset(&rs, &ctx(), dec("500"), &ListingOverrides::none());
        assert_eq!(first.to_json(), second.to_json());
    }
}
