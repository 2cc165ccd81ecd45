//! Formula evaluation.
//!
//! All arithmetic uses `rust_decimal::Decimal` with checked operations —
//! no `f64` anywhere in the evaluation path. Field values come from a
//! `FieldResolver`, the runtime seam behind which the eval crate's
//! context sits.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

use crate::ast::{BinOp, Expr, Func};
use crate::path::FieldPath;

/// Source of numeric field values during evaluation. `None` means the
/// field is absent or non-numeric at that path.
pub trait FieldResolver {
    fn number(&self, path: &FieldPath) -> Option<Decimal>;
}

/// Complexity budget for a single formula evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvalLimits {
    pub max_nodes: usize,
    pub max_depth: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        EvalLimits {
            max_nodes: 50,
            max_depth: 16,
        }
    }
}

/// Errors raised while evaluating a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    /// No value at the referenced path.
    MissingField { path: String },
    DivisionByZero,
    /// Arithmetic overflowed Decimal's range.
    Overflow { detail: String },
    /// `^` exponent is not an integer in 0..=32.
    BadExponent { detail: String },
    /// Formula exceeds the complexity budget.
    TooComplex {
        nodes: usize,
        depth: usize,
        max_nodes: usize,
        max_depth: usize,
    },
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaError::MissingField { path } => {
                write!(f, "no numeric value for field '{}'", path)
            }
            FormulaError::DivisionByZero => write!(f, "division by zero"),
            FormulaError::Overflow { detail } => write!(f, "arithmetic overflow: {}", detail),
            FormulaError::BadExponent { detail } => write!(f, "invalid exponent: {}", detail),
            FormulaError::TooComplex {
                nodes,
                depth,
                max_nodes,
                max_depth,
            } => write!(
                f,
                "formula too complex: {} nodes (max {}), depth {} (max {})",
                nodes, max_nodes, depth, max_depth
            ),
        }
    }
}

/// Evaluate an expression with the default complexity budget.
pub fn evaluate(expr: &Expr, resolver: &dyn FieldResolver) -> Result<Decimal, FormulaError> {
    evaluate_with_limits(expr, resolver, EvalLimits::default())
}

pub fn evaluate_with_limits(
    expr: &Expr,
    resolver: &dyn FieldResolver,
    limits: EvalLimits,
) -> Result<Decimal, FormulaError> {
    let nodes = expr.node_count();
    let depth = expr.depth();
    if nodes > limits.max_nodes || depth > limits.max_depth {
        return Err(FormulaError::TooComplex {
            nodes,
            depth,
            max_nodes: limits.max_nodes,
            max_depth: limits.max_depth,
        });
    }
    eval_node(expr, resolver)
}

fn eval_node(expr: &Expr, resolver: &dyn FieldResolver) -> Result<Decimal, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Field(path) => resolver
            .number(path)
            .ok_or_else(|| FormulaError::MissingField {
                path: path.to_string(),
            }),
        Expr::Group(inner) => eval_node(inner, resolver),
        Expr::Neg(inner) => Ok(-eval_node(inner, resolver)?),
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_node(lhs, resolver)?;
            let r = eval_node(rhs, resolver)?;
            eval_binop(*op, l, r)
        }
        Expr::Call { func, args } => {
            let mut vals = Vec::with_capacity(args.len());
            for arg in args {
                vals.push(eval_node(arg, resolver)?);
            }
            eval_call(*func, &vals)
        }
    }
}

fn eval_binop(op: BinOp, l: Decimal, r: Decimal) -> Result<Decimal, FormulaError> {
    match op {
        BinOp::Add => l.checked_add(r).ok_or_else(|| overflow("addition")),
        BinOp::Sub => l.checked_sub(r).ok_or_else(|| overflow("subtraction")),
        BinOp::Mul => l.checked_mul(r).ok_or_else(|| overflow("multiplication")),
        BinOp::Div => {
            if r.is_zero() {
                return Err(FormulaError::DivisionByZero);
            }
            l.checked_div(r).ok_or_else(|| overflow("division"))
        }
        BinOp::Rem => {
            if r.is_zero() {
                return Err(FormulaError::DivisionByZero);
            }
            l.checked_rem(r).ok_or_else(|| overflow("remainder"))
        }
        BinOp::Pow => eval_pow(l, r),
    }
}

/// Integer exponentiation by repeated checked multiplication. The
/// exponent must be a whole number in 0..=32.
fn eval_pow(base: Decimal, exponent: Decimal) -> Result<Decimal, FormulaError> {
    if exponent.fract() != Decimal::ZERO {
        return Err(FormulaError::BadExponent {
            detail: format!("{} is not an integer", exponent),
        });
    }
    if exponent.is_sign_negative() || exponent > Decimal::from(32) {
        return Err(FormulaError::BadExponent {
            detail: format!("{} is outside 0..=32", exponent),
        });
    }
    let n = exponent.to_u32().ok_or_else(|| FormulaError::BadExponent {
        detail: format!("{} is not representable", exponent),
    })?;
    let mut acc = Decimal::ONE;
    for _ in 0..n {
        acc = acc
            .checked_mul(base)
            .ok_or_else(|| overflow("exponentiation"))?;
    }
    Ok(acc)
}

fn eval_call(func: Func, vals: &[Decimal]) -> Result<Decimal, FormulaError> {
    match func {
        Func::Min => Ok(vals.iter().copied().fold(vals[0], Decimal::min)),
        Func::Max => Ok(vals.iter().copied().fold(vals[0], Decimal::max)),
        Func::Abs => Ok(vals[0].abs()),
        Func::Floor => Ok(vals[0].floor()),
        Func::Ceil => Ok(vals[0].ceil()),
        Func::Round => {
            let dp = if vals.len() == 2 {
                let digits = vals[1];
                if digits.fract() != Decimal::ZERO
                    || digits.is_sign_negative()
                    || digits > Decimal::from(10)
                {
                    return Err(FormulaError::BadExponent {
                        detail: format!("round() digits {} must be an integer in 0..=10", digits),
                    });
                }
                digits.to_u32().unwrap_or(0)
            } else {
                0
            };
            Ok(vals[0].round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
        }
        Func::Clamp => {
            let (x, lo, hi) = (vals[0], vals[1], vals[2]);
            Ok(x.max(lo).min(hi))
        }
    }
}

fn overflow(what: &str) -> FormulaError {
    FormulaError::Overflow {
        detail: what.to_string(),
    }
}
