//! Solver error types.

use hn_core::{NodeId, PipeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    /// Structural: pressure propagation has nothing to anchor on.
    #[error("network has no node with a fixed boundary pressure")]
    NoPressureSource,

    #[error("pipe {pipe} vanished during the solve")]
    MissingPipe { pipe: PipeId },

    #[error("node {node} vanished during the solve")]
    MissingNode { node: NodeId },

    #[error(transparent)]
    Hydraulics(#[from] hn_hydraulics::HydError),

    #[error(transparent)]
    Graph(#[from] hn_graph::GraphError),
}

pub type SolverResult<T> = Result<T, SolverError>;
