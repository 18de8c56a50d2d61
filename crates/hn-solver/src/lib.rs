//! Steady-state solvers for hydronet networks.
//!
//! A solve pass runs three stages:
//! 1. seed pipe flows from sink demands (`propagation`)
//! 2. correct loop flows until cycle residuals vanish (`hardy_cross` /
//!    `newton`, behind the `LoopCorrector` seam)
//! 3. propagate pressures outward from the fixed boundaries (`propagation`)
//!
//! `NetworkSolver` ties the stages together.

pub mod config;
pub mod correction;
pub mod error;
pub mod hardy_cross;
pub mod newton;
pub mod propagation;
pub mod solve;

pub use config::SolverConfig;
pub use correction::{CorrectionStatus, LoopCorrector};
pub use error::{SolverError, SolverResult};
pub use hardy_cross::HardyCross;
pub use newton::NewtonRaphson;
pub use propagation::{PropagationReport, initialize_flows_from_demands, propagate_pressures};
pub use solve::{NetworkSolver, SolveOutcome, SolverMethod};
