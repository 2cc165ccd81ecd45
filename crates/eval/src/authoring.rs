//! Save-time rule checks.
//!
//! Run by the rule-authoring service before a rule is persisted. All
//! findings are errors that block save; the runtime never re-checks any
//! of this (it assumes structurally valid rules and degrades gracefully
//! on data problems instead).

use appraise_core::{validate_formula, FieldCatalog, ValidationIssue};

use crate::types::{Action, Condition, ConditionTree, Rule, Ruleset};

/// Check a rule's conditions and actions against the field catalog.
pub fn check_rule(rule: &Rule, catalog: &FieldCatalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Err(message) = ConditionTree::build(&rule.conditions) {
        issues.push(ValidationIssue::new(message));
    }
    for cond in &rule.conditions {
        check_condition(cond, catalog, &mut issues);
    }
    for action in &rule.actions {
        check_action(action, catalog, &mut issues);
    }
    issues
}

/// Check every rule in a ruleset, prefixing findings with the rule name.
/// Selection conditions are checked under the pseudo-rule name
/// "(selection)".
pub fn check_ruleset(ruleset: &Ruleset, catalog: &FieldCatalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Err(message) = ConditionTree::build(&ruleset.selection_conditions) {
        issues.push(ValidationIssue::new(format!("(selection): {}", message)));
    }
    for cond in &ruleset.selection_conditions {
        let mut found = Vec::new();
        check_condition(cond, catalog, &mut found);
        issues.extend(prefix("(selection)", found));
    }

    for group in &ruleset.groups {
        for rule in &group.rules {
            issues.extend(prefix(&rule.name, check_rule(rule, catalog)));
        }
    }
    issues
}

fn prefix(name: &str, found: Vec<ValidationIssue>) -> Vec<ValidationIssue> {
    found
        .into_iter()
        .map(|issue| ValidationIssue {
            message: format!("{}: {}", name, issue.message),
            position: issue.position,
            field: issue.field,
        })
        .collect()
}

fn check_condition(cond: &Condition, catalog: &FieldCatalog, issues: &mut Vec<ValidationIssue>) {
    let path = &cond.field_path;
    let field = path.to_string();

    let declared = match catalog.field_type(path) {
        Some(t) => t,
        None => {
            issues.push(ValidationIssue::for_field(field, "unknown field"));
            return;
        }
    };

    if declared != cond.field_type {
        issues.push(ValidationIssue::for_field(
            field.clone(),
            format!(
                "declared as {} but the registry says {}",
                cond.field_type.name(),
                declared.name()
            ),
        ));
    }

    if !cond.operator.compatible_with(declared) {
        issues.push(ValidationIssue::for_field(
            field.clone(),
            format!(
                "operator '{}' is invalid for a {} field",
                cond.operator.as_str(),
                declared.name()
            ),
        ));
    }

    if !catalog.operator_allowed(path, cond.operator.as_str()) {
        issues.push(ValidationIssue::for_field(
            field.clone(),
            format!(
                "operator '{}' is not allowed by the registry for this field",
                cond.operator.as_str()
            ),
        ));
    }

    if !cond.operator.is_nullary() && cond.value.is_null() {
        issues.push(ValidationIssue::for_field(
            field,
            format!("operator '{}' requires a value", cond.operator.as_str()),
        ));
    }
}

fn check_action(action: &Action, catalog: &FieldCatalog, issues: &mut Vec<ValidationIssue>) {
    match action {
        Action::FixedValue { .. } => {}
        Action::PerUnit { metric, .. } => check_metric(metric, catalog, issues),
        Action::BenchmarkBased {
            metric, benchmark, ..
        } => {
            check_metric(metric, catalog, issues);
            check_metric(benchmark, catalog, issues);
        }
        Action::Formula { formula, .. } => {
            let check = validate_formula(formula, catalog, None);
            for err in check.errors {
                issues.push(ValidationIssue {
                    message: err.message,
                    position: err.position,
                    field: None,
                });
            }
        }
    }

    for def in action.multipliers() {
        if !catalog.contains(&def.field_path) {
            issues.push(ValidationIssue::for_field(
                def.field_path.to_string(),
                "unknown multiplier field",
            ));
        }
        if def.conditions.is_empty() {
            issues.push(ValidationIssue::for_field(
                def.field_path.to_string(),
                "multiplier has no cases",
            ));
        }
    }
}

fn check_metric(
    metric: &appraise_core::FieldPath,
    catalog: &FieldCatalog,
    issues: &mut Vec<ValidationIssue>,
) {
    use appraise_core::FieldType;
    match catalog.field_type(metric) {
        None => issues.push(ValidationIssue::for_field(
            metric.to_string(),
            "unknown metric field",
        )),
        Some(FieldType::Number) => {}
        Some(other) => issues.push(ValidationIssue::for_field(
            metric.to_string(),
            format!("metric must be numeric, field is {}", other.name()),
        )),
    }
}
