//! Condition rows and the grouped condition tree.
//!
//! The wire format is a flat list of condition rows carrying a
//! `group_order` nesting key. At load time the rows are grouped into an
//! explicit `ConditionTree` and the grouping is checked once, so the
//! evaluator never discovers a malformed structure mid-run.
//!
//! Combination rule: rows sharing a `group_order` form one group, joined
//! by the group's shared operator (taken from the second row onward,
//! default AND). Groups join left-to-right; each group attaches to the
//! result so far using its first row's `logical_operator` (default AND).
//! The first row's operator of group 0 is ignored.

use serde::Deserialize;

use appraise_core::{FieldPath, FieldType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOp {
    And,
    Or,
}

impl Default for LogicalOp {
    fn default() -> Self {
        LogicalOp::And
    }
}

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::In => "in",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
        }
    }

    /// Whether the operator makes sense for a field of the given type.
    /// Checked at authoring time, never at runtime.
    pub fn compatible_with(&self, field_type: FieldType) -> bool {
        match self {
            Operator::Eq | Operator::Neq | Operator::In | Operator::IsNull | Operator::IsNotNull => {
                true
            }
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                field_type == FieldType::Number
            }
            Operator::Contains => field_type == FieldType::Text,
        }
    }

    /// Operators that take no comparison value.
    pub fn is_nullary(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

/// One leaf condition row as authored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub field_path: FieldPath,
    pub field_type: FieldType,
    pub operator: Operator,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub logical_operator: LogicalOp,
    #[serde(default)]
    pub group_order: u32,
    #[serde(default)]
    pub negated: bool,
}

/// Grouped form of a rule's conditions, built once at load.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTree {
    Leaf(Condition),
    Group {
        /// Operator joining the children of this group.
        op: LogicalOp,
        negated: bool,
        children: Vec<ConditionTree>,
    },
}

impl ConditionTree {
    /// Group flat rows by `group_order` into a two-level tree.
    ///
    /// Distinct group orders must form a dense run starting at 0; a gap
    /// is a reference to a non-existent group and rejects the rule.
    /// Returns `None` for an empty row list (a rule with no conditions
    /// always matches, which the orchestrator handles directly).
    pub fn build(rows: &[Condition]) -> Result<Option<ConditionTree>, String> {
        if rows.is_empty() {
            return Ok(None);
        }

        let mut orders: Vec<u32> = rows.iter().map(|c| c.group_order).collect();
        orders.sort_unstable();
        orders.dedup();
        for (i, order) in orders.iter().enumerate() {
            if *order != i as u32 {
                return Err(format!(
                    "condition references group {} but group {} does not exist",
                    order, i
                ));
            }
        }

        let mut groups = Vec::with_capacity(orders.len());
        for order in &orders {
            let members: Vec<&Condition> =
                rows.iter().filter(|c| c.group_order == *order).collect();
            // Shared within-group operator: first row's logical_operator
            // joins the group to its predecessor, so take the second's.
            let op = members
                .get(1)
                .map(|c| c.logical_operator)
                .unwrap_or_default();
            let children: Vec<ConditionTree> = members
                .iter()
                .map(|c| ConditionTree::Leaf((*c).clone()))
                .collect();
            let join = members[0].logical_operator;
            groups.push((join, ConditionTree::Group {
                op,
                negated: false,
                children,
            }));
        }

        // Groups join left-to-right by folding; a single group stands
        // alone.
        let mut iter = groups.into_iter();
        let mut tree = match iter.next() {
            Some((_, first)) => first,
            None => return Ok(None),
        };
        for (join, group) in iter {
            tree = ConditionTree::Group {
                op: join,
                negated: false,
                children: vec![tree, group],
            };
        }
        Ok(Some(tree))
    }

    /// Every leaf condition in the tree.
    pub fn leaves(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            ConditionTree::Leaf(c) => out.push(c),
            ConditionTree::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(field: &str, group_order: u32, logical: LogicalOp) -> Condition {
        Condition {
            field_path: FieldPath::parse(field).unwrap(),
            field_type: FieldType::Number,
            operator: Operator::Gte,
            value: serde_json::json!(1),
            logical_operator: logical,
            group_order,
            negated: false,
        }
    }

    #[test]
    fn single_group_builds_flat() {
        let rows = vec![
            row("ram_gb", 0, LogicalOp::And),
            row("ssd_gb", 0, LogicalOp::And),
        ];
        match ConditionTree::build(&rows).unwrap().unwrap() {
            ConditionTree::Group { op, children, .. } => {
                assert_eq!(op, LogicalOp::And);
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn within_group_operator_comes_from_second_row() {
        let rows = vec![
            row("a", 0, LogicalOp::And),
            row("b", 0, LogicalOp::Or),
            row("c", 0, LogicalOp::Or),
        ];
        match ConditionTree::build(&rows).unwrap().unwrap() {
            ConditionTree::Group { op, .. } => assert_eq!(op, LogicalOp::Or),
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn groups_join_on_first_row_operator() {
        let rows = vec![
            row("a", 0, LogicalOp::And),
            row("b", 1, LogicalOp::Or),
            row("c", 1, LogicalOp::And),
        ];
        match ConditionTree::build(&rows).unwrap().unwrap() {
            ConditionTree::Group { op, children, .. } => {
                // group 1 attaches with OR (its first row's operator)
                assert_eq!(op, LogicalOp::Or);
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn gap_in_group_orders_is_rejected() {
        let rows = vec![row("a", 0, LogicalOp::And), row("b", 4, LogicalOp::And)];
        let err = ConditionTree::build(&rows).unwrap_err();
        assert!(err.contains("group 4"));
    }

    #[test]
    fn group_orders_must_start_at_zero() {
        let rows = vec![row("a", 1, LogicalOp::And)];
        assert!(ConditionTree::build(&rows).is_err());
    }

    #[test]
    fn empty_rows_build_nothing() {
        assert_eq!(ConditionTree::build(&[]).unwrap(), None);
    }

    #[test]
    fn deserializes_wire_row() {
        let c: Condition = serde_json::from_value(serde_json::json!({
            "field_path": "ram_spec.ddr_generation",
            "field_type": "text",
            "operator": "eq",
            "value": "ddr5",
            "logical_operator": "AND",
            "group_order": 0
        }))
        .unwrap();
        assert_eq!(c.operator, Operator::Eq);
        assert!(!c.negated);
    }

    #[test]
    fn operator_type_compatibility() {
        assert!(Operator::Gt.compatible_with(FieldType::Number));
        assert!(!Operator::Gt.compatible_with(FieldType::Text));
        assert!(!Operator::Contains.compatible_with(FieldType::Number));
        assert!(Operator::Contains.compatible_with(FieldType::Text));
        assert!(Operator::IsNull.compatible_with(FieldType::Boolean));
    }
}
