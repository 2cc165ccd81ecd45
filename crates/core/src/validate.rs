//! Authoring-time formula validation.
//!
//! Runs after parse and before a rule is persisted: every field
//! reference must resolve to a numeric field in the catalog. All issues
//! are collected in one pass rather than stopping at the first.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::Expr;
use crate::catalog::{FieldCatalog, FieldType};
use crate::error::{SyntaxError, ValidationIssue};
use crate::eval::{evaluate, FieldResolver};
use crate::parser::parse;

/// Outcome of validating a parsed expression against the field catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub referenced_fields: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate(expr: &Expr, catalog: &FieldCatalog) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let referenced = expr.referenced_fields();

    for path in &referenced {
        match catalog.field_type(path) {
            None => errors.push(ValidationIssue::for_field(
                path.to_string(),
                "unknown field",
            )),
            Some(FieldType::Number) => {}
            Some(other) => errors.push(ValidationIssue::for_field(
                path.to_string(),
                format!("{} field cannot be used in a formula", other.name()),
            )),
        }
    }

    if referenced.is_empty() {
        warnings.push(ValidationIssue::new(
            "formula references no fields; its value is constant",
        ));
    }

    ValidationReport {
        errors,
        warnings,
        referenced_fields: referenced.iter().map(|p| p.to_string()).collect(),
    }
}

/// The authoring-service contract: parse + validate in one call, with an
/// optional preview evaluation against sample data.
#[derive(Debug, Clone, Serialize)]
pub struct FormulaCheck {
    pub valid: bool,
    pub errors: Vec<FormulaCheckError>,
    pub referenced_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormulaCheckError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl From<SyntaxError> for FormulaCheckError {
    fn from(e: SyntaxError) -> Self {
        let message = match &e.suggestion {
            Some(s) => format!("{}; did you mean {}?", e.message, s),
            None => e.message.clone(),
        };
        FormulaCheckError {
            message,
            position: Some(e.position),
        }
    }
}

pub fn validate_formula(
    text: &str,
    catalog: &FieldCatalog,
    sample: Option<&dyn FieldResolver>,
) -> FormulaCheck {
    let expr = match parse(text) {
        Ok(expr) => expr,
        Err(e) => {
            return FormulaCheck {
                valid: false,
                errors: vec![e.into()],
                referenced_fields: Vec::new(),
                preview_value: None,
            };
        }
    };

    let report = validate(&expr, catalog);
    let valid = report.is_valid();
    let errors = report
        .errors
        .into_iter()
        .map(|issue| FormulaCheckError {
            message: issue.to_string(),
            position: None,
        })
        .collect();

    let preview_value = match (valid, sample) {
        (true, Some(resolver)) => evaluate(&expr, resolver).ok(),
        _ => None,
    };

    FormulaCheck {
        valid,
        errors,
        referenced_fields: report.referenced_fields,
        preview_value,
    }
}
