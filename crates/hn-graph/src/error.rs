//! Graph-specific error types.

use hn_core::{NodeId, PipeId};
use thiserror::Error;

/// Network construction and mutation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {node} not found")]
    NodeNotFound { node: NodeId },

    #[error("Pipe {pipe} not found")]
    PipeNotFound { pipe: PipeId },

    #[error("Pipe endpoint {node} does not exist")]
    EndpointMissing { node: NodeId },

    #[error("Pipe endpoints must be distinct nodes")]
    SelfLoop,

    #[error("Node {node} still has attached pipes")]
    NodeInUse { node: NodeId },
}
