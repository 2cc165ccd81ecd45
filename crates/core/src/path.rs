//! Dotted field paths.
//!
//! A `FieldPath` is the validated form of a dotted field reference such as
//! `ram_spec.ddr_generation`. Paths are parsed and checked once, then
//! carried by value through rules and formulas instead of being re-split
//! per evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated dotted field path. Segments are non-empty identifiers
/// (`[A-Za-z_][A-Za-z0-9_]*`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path, rejecting empty segments and non-identifier
    /// characters.
    pub fn parse(text: &str) -> Result<FieldPath, String> {
        if text.is_empty() {
            return Err("field path is empty".to_string());
        }
        let mut segments = Vec::new();
        for seg in text.split('.') {
            if seg.is_empty() {
                return Err(format!("field path '{}' has an empty segment", text));
            }
            let mut chars = seg.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
                _ => {
                    return Err(format!(
                        "field path segment '{}' must start with a letter or underscore",
                        seg
                    ));
                }
            }
            if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(format!("field path segment '{}' has invalid characters", seg));
            }
            segments.push(seg.to_string());
        }
        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment — the top-level key in an evaluation context.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FieldPath::parse(&s)
    }
}

impl From<FieldPath> for String {
    fn from(p: FieldPath) -> String {
        p.to_string()
    }
}
