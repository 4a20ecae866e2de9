//! Error types for nmos-switch.

use thiserror::Error;

use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("transistor {index} references node {node}, outside 0..{node_count}")]
    NodeOutOfRange {
        index: usize,
        node: NodeId,
        node_count: usize,
    },

    #[error("{role} node {node} outside 0..{node_count}")]
    SentinelOutOfRange {
        role: &'static str,
        node: NodeId,
        node_count: usize,
    },

    #[error("power and ground are both node {0}")]
    SentinelsCoincide(NodeId),

    #[error("network did not settle within {budget} group evaluations")]
    Unsettled { budget: usize },
}

pub type Result<T> = std::result::Result<T, NetworkError>;
