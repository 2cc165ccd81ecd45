//! Formula AST.
//!
//! Produced by the parser, consumed by validation and evaluation. The
//! node set is deliberately closed: only whitelisted functions and
//! operators exist, so an `Expr` that parsed is structurally safe to
//! evaluate.

use rust_decimal::Decimal;

use crate::path::FieldPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "^",
        }
    }
}

/// Whitelisted formula functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Min,
    Max,
    Round,
    Floor,
    Ceil,
    Clamp,
    Abs,
}

pub const FUNC_NAMES: &[&str] = &["min", "max", "round", "floor", "ceil", "clamp", "abs"];

impl Func {
    pub fn from_name(name: &str) -> Option<Func> {
        match name {
            "min" => Some(Func::Min),
            "max" => Some(Func::Max),
            "round" => Some(Func::Round),
            "floor" => Some(Func::Floor),
            "ceil" => Some(Func::Ceil),
            "clamp" => Some(Func::Clamp),
            "abs" => Some(Func::Abs),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Func::Min => "min",
            Func::Max => "max",
            Func::Round => "round",
            Func::Floor => "floor",
            Func::Ceil => "ceil",
            Func::Clamp => "clamp",
            Func::Abs => "abs",
        }
    }

    /// Accepted argument counts as an inclusive (min, max) pair.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Func::Min | Func::Max => (2, usize::MAX),
            Func::Round => (1, 2),
            Func::Floor | Func::Ceil | Func::Abs => (1, 1),
            Func::Clamp => (3, 3),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Decimal),
    Field(FieldPath),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Neg(Box<Expr>),
    Call { func: Func, args: Vec<Expr> },
    /// Parenthesized sub-expression, kept so authoring tools can render
    /// the formula back faithfully.
    Group(Box<Expr>),
}

impl Expr {
    /// Total node count, used by the evaluation complexity budget.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Field(_) => 1,
            Expr::Binary { lhs, rhs, .. } => 1 + lhs.node_count() + rhs.node_count(),
            Expr::Neg(inner) | Expr::Group(inner) => 1 + inner.node_count(),
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
        }
    }

    /// Maximum nesting depth.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Field(_) => 1,
            Expr::Binary { lhs, rhs, .. } => 1 + lhs.depth().max(rhs.depth()),
            Expr::Neg(inner) | Expr::Group(inner) => 1 + inner.depth(),
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::depth).max().unwrap_or(0),
        }
    }

    /// All field paths referenced by the expression, in first-seen order,
    /// deduplicated.
    pub fn referenced_fields(&self) -> Vec<FieldPath> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<FieldPath>) {
        match self {
            Expr::Number(_) => {}
            Expr::Field(path) => {
                if !out.contains(path) {
                    out.push(path.clone());
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_fields(out);
                rhs.collect_fields(out);
            }
            Expr::Neg(inner) | Expr::Group(inner) => inner.collect_fields(out),
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_fields(out);
                }
            }
        }
    }
}
