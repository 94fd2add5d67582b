//! Error types for the diagram engine

use thiserror::Error;

use crate::objects::NodeId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("Invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Document invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        EngineError::MalformedInput { line, reason: reason.into() }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidOperation(reason.into())
    }
}

/// A broken tree or selection invariant. Always a programming defect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("node {0} appears in more than one place")]
    DuplicateId(NodeId),

    #[error("group {0} has no children")]
    EmptyGroup(NodeId),

    #[error("selection references missing node {0}")]
    DanglingSelection(NodeId),

    #[error("selection references non-selectable node {0}")]
    UnselectableSelection(NodeId),

    #[error("group member {0} is independently movable or selectable")]
    IndependentChild(NodeId),

    #[error("top-level node {0} is not movable and selectable")]
    LockedRoot(NodeId),
}

pub type Result<T> = std::result::Result<T, EngineError>;
