//! Loop-flow correction: the strategy seam shared by both correctors.
//!
//! A correction pass adjusts pipe flows so the signed pressure drop around
//! every fundamental cycle sums to (near) zero. Adding the same loop flow to
//! every pipe of a cycle preserves the flow balance at every node, so the
//! correctors are free to iterate on cycles alone.

use hn_core::{PipeId, m3ps};
use hn_graph::{Cycle, Network};
use hn_hydraulics::{Fluid, PressureModel};

use crate::config::SolverConfig;
use crate::error::{SolverError, SolverResult};

/// Outcome of a loop-correction pass. Non-convergence is reported, not
/// raised: partially corrected flows are still useful for propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrectionStatus {
    /// Every cycle residual fell under the tolerance.
    Converged { iterations: usize },
    /// The iteration cap was hit with residuals still above tolerance.
    IterationCapReached { iterations: usize, max_residual: f64 },
    /// The linearized loop system had no unique solution.
    SingularSystem,
}

impl CorrectionStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// A loop-flow correction scheme.
pub trait LoopCorrector {
    /// Adjust pipe flows in place until every cycle residual is under the
    /// configured tolerance, the iteration cap is hit, or the scheme gives
    /// up on a singular system.
    fn correct(
        &self,
        network: &mut Network,
        cycles: &[Cycle],
        model: &dyn PressureModel,
        fluid: &Fluid,
        config: &SolverConfig,
    ) -> SolverResult<CorrectionStatus>;
}

/// Residual and loop-flow derivative of one cycle at the current flows.
///
/// The residual is the sum of signed drops around the walk. The derivative
/// is d(residual)/dQ for a uniform loop-flow perturbation, 2·dp/q per
/// pipe; zero-flow pipes contribute nothing to it. The quotient is kept
/// signed so a pump that inverts a pipe's drop pulls the derivative down
/// instead of stiffening it.
pub(crate) fn cycle_terms(
    network: &Network,
    cycle: &Cycle,
    model: &dyn PressureModel,
    fluid: &Fluid,
) -> SolverResult<(f64, f64)> {
    let mut residual = 0.0;
    let mut derivative = 0.0;
    for &(pid, dir) in &cycle.steps {
        let pipe = network
            .pipe(pid)
            .ok_or(SolverError::MissingPipe { pipe: pid })?;
        let q = pipe.flow.map_or(0.0, |q| q.value);
        let dp = model.pipe_drop(pipe, fluid, q)?;
        residual += f64::from(dir) * dp;
        if q.abs() > 0.0 {
            derivative += 2.0 * dp / q;
        }
    }
    Ok((residual, derivative))
}

/// Loop-flow sensitivity 2·dp/q of a single pipe, zero at rest. Signed:
/// negative when a pump dominates the friction loss.
pub(crate) fn pipe_stiffness(
    network: &Network,
    pipe: PipeId,
    model: &dyn PressureModel,
    fluid: &Fluid,
) -> SolverResult<f64> {
    let p = network
        .pipe(pipe)
        .ok_or(SolverError::MissingPipe { pipe })?;
    let q = p.flow.map_or(0.0, |q| q.value);
    if q.abs() == 0.0 {
        return Ok(0.0);
    }
    let dp = model.pipe_drop(p, fluid, q)?;
    Ok(2.0 * dp / q)
}

/// Add `delta` (m^3/s) to a pipe's flow.
pub(crate) fn nudge_flow(network: &mut Network, pipe: PipeId, delta: f64) -> SolverResult<()> {
    let p = network
        .pipe_mut(pipe)
        .ok_or(SolverError::MissingPipe { pipe })?;
    let q = p.flow.map_or(0.0, |q| q.value);
    p.flow = Some(m3ps(q + delta));
    Ok(())
}
