//! Status parsing

use thiserror::Error;

/// Raised when a stored status string does not name a known variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct StatusParseError {
    /// The kind of value being parsed, e.g. "cart status".
    pub kind: &'static str,

    /// The unrecognised input.
    pub value: String,
}

impl StatusParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
