//! Error types for document tree operations
//!
//! Flat hierarchy. Public helpers swallow these and no-op; the arena itself
//! reports them so callers that care can tell what went wrong.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Document has no root node")]
    NoRoot,

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Cannot insert node {child} under {parent}: it is an inclusive ancestor")]
    HierarchyRequest { parent: u32, child: u32 },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
