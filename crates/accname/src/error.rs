//! Error types for name computation
//!
//! Every variant is a computation fault. The orchestrator treats them all the
//! same way: the fault lands in `AccessibleName::error` and the strings stay
//! empty.

use dom::{DomError, NodeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AccNameError>;

#[derive(Debug, Error)]
pub enum AccNameError {
    #[error("Tree access failed: {0}")]
    Tree(#[from] DomError),

    #[error("Oracle fault: {0}")]
    Oracle(String),

    #[error("Unexpected node {node}: expected {expected}")]
    UnexpectedNode { node: NodeId, expected: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Computation panicked: {0}")]
    Panicked(String),
}
