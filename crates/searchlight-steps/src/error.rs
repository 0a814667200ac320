//! Error types for searchlight-steps.

use thiserror::Error;

use crate::catalog::{AlgorithmId, InputKind};
use crate::step::NodeId;

/// Result type for graph construction.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Reasons a graph description is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two nodes share an id.
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    /// An edge, the start or the target names a node that does not exist.
    #[error("{role} refers to unknown node {id}")]
    UnknownNode { role: &'static str, id: NodeId },

    /// Start and target are the same node.
    #[error("start and target are both {0}")]
    DegenerateRoute(NodeId),

    /// Edge weights add up past `u64::MAX`, so path costs could overflow.
    #[error("total edge weight exceeds {}", u64::MAX)]
    WeightOverflow,
}

/// An algorithm was handed the wrong shape of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{algorithm} expects {expected}")]
pub struct MismatchError {
    pub algorithm: AlgorithmId,
    pub expected: InputKind,
}
