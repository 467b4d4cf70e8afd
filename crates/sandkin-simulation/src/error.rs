//! Errors raised when parsing user-facing names

use thiserror::Error;

/// A name that does not match any member of a closed set (cell type, species, task...)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {name}. Valid: {valid}")]
pub struct ParseNameError {
    pub kind: &'static str,
    pub name: String,
    pub valid: String,
}

impl ParseNameError {
    pub fn new(kind: &'static str, name: &str, valid: &[&str]) -> Self {
        Self {
            kind,
            name: name.to_string(),
            valid: valid.join(", "),
        }
    }
}
