use serde::{Deserialize, Serialize};
use std::fmt;

/// What a non-fatal diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An optional column is absent; its field falls back to "Unknown".
    MissingOptionalColumn,
    /// A rule line whose cost is not a number.
    InvalidRuleValue,
    /// A rule line whose cost is negative.
    NegativeRuleValue,
    /// A rule line in a shorthand that had to be interpreted.
    AmbiguousRule,
    /// A rule line with a known prefix but a label outside the vocabulary.
    UnknownRuleLabel,
    /// A manual override whose value is not a non-negative number.
    InvalidOverride,
    /// A manual override for a key outside the vocabulary.
    UnknownOverride,
    /// A row's process/step pair has no rule; priced at zero.
    UnresolvedProcessStep,
    /// A row's coating has no rule; priced at zero.
    UnresolvedCoating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Data row (0-based) or rule line (1-based) the diagnostic refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: None,
            message: message.into(),
        }
    }

    pub fn at(kind: DiagnosticKind, location: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: Some(location),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "[{loc}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
