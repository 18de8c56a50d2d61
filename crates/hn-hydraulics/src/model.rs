//! The pressure model consumed by the network solvers.

use hn_core::ensure_finite;
use hn_graph::{Node, Pipe};
use tracing::debug;

use crate::error::HydResult;
use crate::fluid::Fluid;
use crate::friction::FrictionCorrelation;

/// Flows below this velocity produce no measurable drop.
const EPSILON_VELOCITY: f64 = 1e-9;

/// Pure pressure-drop/head-gain interface.
///
/// Implementations must be deterministic functions of their inputs: the
/// solvers call these repeatedly while iterating and rely on reproducible
/// values for convergence.
pub trait PressureModel: Send + Sync {
    /// Signed pressure drop over a pipe for a signed flow rate (m^3/s).
    ///
    /// The sign follows the flow: positive flow gives the drop from start to
    /// end, negative flow the (negative) drop, so `p_end = p_start - drop`
    /// holds for either direction. Pump-curve gain enters with opposite sign
    /// and can make the result negative.
    fn pipe_drop(&self, pipe: &Pipe, fluid: &Fluid, flow: f64) -> HydResult<f64>;

    /// Head gain at a node for a given inlet pressure (Pa). Nonzero only for
    /// pump nodes.
    fn node_gain(&self, node: &Node, inlet_pressure: f64) -> f64;

    /// Loss across a node-mounted valve with coefficient K, for the flow
    /// carried by `pipe`.
    fn valve_loss(&self, k: f64, pipe: &Pipe, fluid: &Fluid, flow: f64) -> f64;
}

/// Default model: Darcy-Weisbach friction with selectable correlation,
/// homogeneous-mixture multi-phase, valve K losses and pump-curve gains.
#[derive(Debug, Clone, Copy, Default)]
pub struct DarcyWeisbach {
    pub correlation: FrictionCorrelation,
}

impl DarcyWeisbach {
    pub fn new(correlation: FrictionCorrelation) -> Self {
        Self { correlation }
    }

    /// Drop magnitude for a flow magnitude, before sign restoration.
    fn drop_magnitude(&self, pipe: &Pipe, fluid: &Fluid, q_abs: f64) -> HydResult<f64> {
        let area = pipe.effective_area();
        if area <= 0.0 {
            return Ok(0.0);
        }
        let v = q_abs / area;
        if v < EPSILON_VELOCITY {
            // Still let an idling pump push its shutoff head.
            return Ok(self.pump_gain(pipe, 0.0).map_or(0.0, |g| -g));
        }

        let rho = fluid.effective_density();
        let mu = fluid.effective_viscosity();
        let d = pipe.effective_diameter();

        let re = ensure_finite(rho * v * d / mu, "Reynolds number")?;
        let f = self.correlation.friction_factor(re, pipe.roughness.value / d);
        let mut dp = f * (pipe.length.value / d) * (rho * v * v / 2.0);
        debug!(pipe = %pipe.id, re, f, dp, "pipe friction");

        if let Some(valve) = &pipe.valve {
            dp += valve.pressure_drop(rho, v);
        }
        if let Some(gain) = self.pump_gain(pipe, q_abs) {
            dp -= gain;
        }
        ensure_finite(dp, "pressure drop").map_err(Into::into)
    }

    fn pump_gain(&self, pipe: &Pipe, q_abs: f64) -> Option<f64> {
        pipe.pump_curve
            .map(|curve| curve.pressure_gain(q_abs) * pipe.pump_multiplier)
    }
}

impl PressureModel for DarcyWeisbach {
    fn pipe_drop(&self, pipe: &Pipe, fluid: &Fluid, flow: f64) -> HydResult<f64> {
        let magnitude = self.drop_magnitude(pipe, fluid, flow.abs())?;
        Ok(if flow < 0.0 { -magnitude } else { magnitude })
    }

    fn node_gain(&self, node: &Node, inlet_pressure: f64) -> f64 {
        match (node.is_pump, node.pressure_ratio) {
            (true, Some(ratio)) => inlet_pressure * (ratio - 1.0),
            _ => 0.0,
        }
    }

    fn valve_loss(&self, k: f64, pipe: &Pipe, fluid: &Fluid, flow: f64) -> f64 {
        let area = pipe.effective_area();
        if area <= 0.0 {
            return 0.0;
        }
        let v = flow.abs() / area;
        let rho = fluid.effective_density();
        k * rho * v * v / 2.0
    }
}
