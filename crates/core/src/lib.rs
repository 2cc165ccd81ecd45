//! Appraise formula engine -- parses, validates, and evaluates the
//! restricted arithmetic expression language used by pricing rules.
//!
//! The crate also owns the two authoring-time value objects shared with
//! the rule engine: `FieldPath` (validated dotted field references) and
//! `FieldCatalog` (the local view of the Field Registry export).
//!
//! Pipeline: `parse` text into an `Expr`, `validate` it against a
//! `FieldCatalog` before persisting, `evaluate` it against a
//! `FieldResolver` at runtime. Parse and validation errors block save;
//! evaluation errors are reported to the caller, which treats them as
//! per-rule warnings.

pub mod ast;
pub mod catalog;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod validate;

pub use ast::{BinOp, Expr, Func};
pub use catalog::{FieldCatalog, FieldDef, FieldType};
pub use error::{SyntaxError, ValidationIssue};
pub use eval::{evaluate, evaluate_with_limits, EvalLimits, FieldResolver, FormulaError};
pub use parser::parse;
pub use path::FieldPath;
pub use validate::{validate, validate_formula, FormulaCheck, FormulaCheckError, ValidationReport};
