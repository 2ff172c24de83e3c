//! Error types for fix callbacks and cancellation.

use thiserror::Error;

/// Failure of a rule's fix callback for one unit.
///
/// A `FixError` never escapes the engine: the unit it occurred in is left
/// unchanged and every other unit proceeds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixError {
    #[error("{0}")]
    Message(String),

    /// The callback was handed a node it cannot fix.
    #[error("cannot fix `{kind}` node: {reason}")]
    UnexpectedNode {
        kind: &'static str,
        reason: String,
    },
}

impl FixError {
    pub fn message(message: impl Into<String>) -> Self {
        FixError::Message(message.into())
    }
}

/// A pass observed its cancellation token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("remediation cancelled")]
pub struct Cancelled;
