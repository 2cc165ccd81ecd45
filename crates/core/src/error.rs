use serde::Serialize;
use std::fmt;

/// A syntax error in formula text. `position` is the character offset
/// into the source where the error was detected.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SyntaxError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        SyntaxError {
            message: message.into(),
            position,
            suggestion: None,
        }
    }

    pub fn with_suggestion(
        position: usize,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        SyntaxError {
            message: message.into(),
            position,
            suggestion: Some(suggestion.into()),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.message, self.position)?;
        if let Some(s) = &self.suggestion {
            write!(f, "; did you mean {}?", s)?;
        }
        Ok(())
    }
}

/// An authoring-time validation finding. Errors block save; warnings do not.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationIssue {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationIssue {
            message: message.into(),
            position: None,
            field: None,
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            message: message.into(),
            position: None,
            field: Some(field.into()),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
