//! Transient simulation error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransientError {
    #[error("time step must be positive and finite, got {value}")]
    BadTimeStep { value: f64 },

    #[error("total time must be positive and finite, got {value}")]
    BadTotalTime { value: f64 },

    #[error("network has no nodes to simulate")]
    EmptyNetwork,

    #[error(transparent)]
    Solver(#[from] hn_solver::SolverError),
}

pub type SimResult<T> = Result<T, TransientError>;
