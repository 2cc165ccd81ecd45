//! Appraise valuation rule evaluator -- turns (listing context, rule
//! definitions) into a price adjustment breakdown.
//!
//! The engine is a synchronous pure function: rule snapshots and the
//! evaluation context arrive pre-hydrated, nothing here performs I/O,
//! and the same inputs always produce the same `EvaluationResult`.
//! Runtime problems never abort a call; they accumulate as warnings and
//! per-rule error entries on the result, so bulk recalculation is
//! resilient to any single bad rule or bad data point.
//!
//! Entry points: `appraise` (select + evaluate), `evaluate_ruleset`
//! (evaluate a known ruleset), and `authoring::check_rule` /
//! `check_ruleset` (save-time validation for the rule-authoring
//! service).

pub mod action;
pub mod authoring;
pub mod breakdown;
pub mod condition;
pub mod context;
pub mod orchestrator;
pub mod resolver;
pub mod types;

pub use breakdown::{EvaluationResult, InactiveRule, MatchedRule, RulesetRef};
pub use condition::{eval_tree, MatchOutcome};
pub use context::{EvaluationContext, Value};
pub use orchestrator::{evaluate_ruleset, ListingOverrides};
pub use resolver::{appraise, select_ruleset};
pub use types::{
    Action, Condition, ConditionTree, ConfigError, LogicalOp, Multiplier, MultiplierCase,
    Operator, Rule, RuleGroup, Ruleset, Warning,
};
