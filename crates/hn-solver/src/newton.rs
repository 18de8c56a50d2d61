//! Newton-Raphson simultaneous loop correction.

use std::collections::BTreeMap;

use hn_core::PipeId;
use hn_graph::{Cycle, Network};
use hn_hydraulics::{Fluid, PressureModel};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::config::SolverConfig;
use crate::correction::{CorrectionStatus, LoopCorrector, cycle_terms, nudge_flow, pipe_stiffness};
use crate::error::SolverResult;

/// Newton-Raphson over all loop flows at once.
///
/// Each iteration solves `J * delta = -R` where `R` holds the cycle
/// residuals and `J[i][j]` couples cycles i and j through their shared
/// pipes. Converges faster than Hardy-Cross on tightly coupled loops, at
/// the cost of a dense linear solve per iteration.
#[derive(Debug, Clone, Copy)]
pub struct NewtonRaphson {
    /// Determinant magnitude below which the Jacobian counts as singular.
    pub det_epsilon: f64,
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        Self { det_epsilon: 1e-12 }
    }
}

impl LoopCorrector for NewtonRaphson {
    fn correct(
        &self,
        network: &mut Network,
        cycles: &[Cycle],
        model: &dyn PressureModel,
        fluid: &Fluid,
        config: &SolverConfig,
    ) -> SolverResult<CorrectionStatus> {
        let n = cycles.len();
        if n == 0 {
            return Ok(CorrectionStatus::Converged { iterations: 0 });
        }
        // Signed membership per cycle; fixed for the whole pass.
        let memberships: Vec<BTreeMap<PipeId, f64>> = cycles
            .iter()
            .map(|c| c.steps.iter().map(|&(p, d)| (p, f64::from(d))).collect())
            .collect();

        let mut max_residual = f64::INFINITY;
        for iteration in 0..config.max_iterations {
            let mut residuals = DVector::<f64>::zeros(n);
            for (i, cycle) in cycles.iter().enumerate() {
                let (r, _) = cycle_terms(network, cycle, model, fluid)?;
                residuals[i] = r;
            }
            max_residual = residuals.amax();
            if max_residual < config.tolerance {
                debug!(iteration, max_residual, "loop system converged");
                return Ok(CorrectionStatus::Converged {
                    iterations: iteration,
                });
            }

            // Per-pipe sensitivities at the current flows, then assemble
            // J[i][j] = sum over shared pipes of dir_i * dir_j * 2dp/q.
            let mut stiffness: BTreeMap<PipeId, f64> = BTreeMap::new();
            for membership in &memberships {
                for &pid in membership.keys() {
                    if !stiffness.contains_key(&pid) {
                        stiffness.insert(pid, pipe_stiffness(network, pid, model, fluid)?);
                    }
                }
            }

            let mut jacobian = DMatrix::<f64>::zeros(n, n);
            for (i, membership) in memberships.iter().enumerate() {
                for (pid, di) in membership {
                    let s = stiffness[pid];
                    if s == 0.0 {
                        continue;
                    }
                    for (j, other) in memberships.iter().enumerate() {
                        if let Some(dj) = other.get(pid) {
                            jacobian[(i, j)] += di * dj * s;
                        }
                    }
                }
            }

            let lu = jacobian.lu();
            if lu.determinant().abs() < self.det_epsilon {
                warn!(iteration, "singular loop Jacobian, giving up");
                return Ok(CorrectionStatus::SingularSystem);
            }
            let Some(delta) = lu.solve(&(-residuals)) else {
                warn!(iteration, "loop system solve failed, giving up");
                return Ok(CorrectionStatus::SingularSystem);
            };

            for (i, membership) in memberships.iter().enumerate() {
                for (&pid, &dir) in membership {
                    nudge_flow(network, pid, dir * delta[i])?;
                }
            }
        }

        warn!(max_residual, "iteration cap hit before loop convergence");
        Ok(CorrectionStatus::IterationCapReached {
            iterations: config.max_iterations,
            max_residual,
        })
    }
}
