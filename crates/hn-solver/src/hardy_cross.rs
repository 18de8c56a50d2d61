//! Hardy-Cross loop correction.

use std::collections::BTreeMap;

use hn_core::PipeId;
use hn_graph::{Cycle, Network};
use hn_hydraulics::{Fluid, PressureModel};
use tracing::{debug, warn};

use crate::config::SolverConfig;
use crate::correction::{CorrectionStatus, LoopCorrector, cycle_terms, nudge_flow};
use crate::error::SolverResult;

/// Classic Hardy-Cross: one scalar correction per cycle per sweep.
///
/// Corrections of a sweep are accumulated per pipe and applied together, so
/// a pipe shared by several cycles sees all of their corrections computed
/// against the same flow state.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardyCross;

impl LoopCorrector for HardyCross {
    fn correct(
        &self,
        network: &mut Network,
        cycles: &[Cycle],
        model: &dyn PressureModel,
        fluid: &Fluid,
        config: &SolverConfig,
    ) -> SolverResult<CorrectionStatus> {
        let mut max_residual = f64::INFINITY;
        for iteration in 0..config.max_iterations {
            max_residual = 0.0;
            let mut corrections: BTreeMap<PipeId, f64> = BTreeMap::new();

            for cycle in cycles {
                let (residual, derivative) = cycle_terms(network, cycle, model, fluid)?;
                max_residual = max_residual.max(residual.abs());
                if derivative.abs() < f64::EPSILON {
                    // Nothing flows anywhere in the loop; no linearization.
                    continue;
                }
                let delta = -residual / derivative;
                for &(pid, dir) in &cycle.steps {
                    *corrections.entry(pid).or_insert(0.0) += f64::from(dir) * delta;
                }
            }

            if max_residual < config.tolerance {
                debug!(iteration, max_residual, "loop corrections converged");
                return Ok(CorrectionStatus::Converged {
                    iterations: iteration,
                });
            }
            for (pid, delta) in corrections {
                nudge_flow(network, pid, delta)?;
            }
        }

        warn!(max_residual, "iteration cap hit before loop convergence");
        Ok(CorrectionStatus::IterationCapReached {
            iterations: config.max_iterations,
            max_residual,
        })
    }
}
