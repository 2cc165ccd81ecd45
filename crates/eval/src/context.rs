//! Evaluation context -- the read-only, hydrated view of a listing.
//!
//! The data-access collaborator builds one context per evaluation call
//! from the listing row and its related entities (RAM spec, CPU
//! benchmark, etc.). Lookup is by dotted path and returns `None` for any
//! missing segment; the engine never treats a missing value as an error
//! here.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use appraise_core::{FieldPath, FieldResolver};

/// A context value. Numbers are always `Decimal` -- JSON floats are
/// parsed through their string form, never via `f64` arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(Decimal),
    Text(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert from JSON. `null` becomes `None` -- absence, not a value.
    pub fn from_json(v: &serde_json::Value) -> Option<Value> {
        match v {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                // Exact decimal via the number's textual form
                Decimal::from_str(&n.to_string()).ok().map(Value::Number)
            }
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(items) => Some(Value::List(
                items.iter().filter_map(Value::from_json).collect(),
            )),
            serde_json::Value::Object(map) => {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    if let Some(val) = Value::from_json(v) {
                        out.insert(k.clone(), val);
                    }
                }
                Some(Value::Object(out))
            }
        }
    }
}

/// Immutable nested key/value view with dotted-path lookup.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    root: BTreeMap<String, Value>,
}

impl EvaluationContext {
    pub fn new(root: BTreeMap<String, Value>) -> Self {
        EvaluationContext { root }
    }

    /// Build from a JSON object; non-object input yields an empty context.
    pub fn from_json(v: &serde_json::Value) -> Self {
        match Value::from_json(v) {
            Some(Value::Object(root)) => EvaluationContext { root },
            _ => EvaluationContext::default(),
        }
    }

    /// Resolve a dotted path. Any missing intermediate, or a non-object
    /// in the middle of the path, yields `None`.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.segments().iter();
        let mut current = self.root.get(segments.next()?.as_str())?;
        for seg in segments {
            match current {
                Value::Object(map) => current = map.get(seg.as_str())?,
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn number(&self, path: &FieldPath) -> Option<Decimal> {
        self.get(path).and_then(Value::as_number)
    }

    /// Whether any value (of any type) exists at the path.
    pub fn resolves(&self, path: &FieldPath) -> bool {
        self.get(path).is_some()
    }
}

impl FieldResolver for EvaluationContext {
    fn number(&self, path: &FieldPath) -> Option<Decimal> {
        EvaluationContext::number(self, path)
    }
}
