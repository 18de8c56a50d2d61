//! Solver configuration.

/// Convergence controls shared by both loop correctors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Loop residual tolerance in Pa.
    pub tolerance: f64,
    /// Iteration cap per correction pass.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-2,
            max_iterations: 50,
        }
    }
}
