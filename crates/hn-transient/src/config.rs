//! Transient run configuration.

use hn_solver::{SolverConfig, SolverMethod};

use crate::water_hammer::WaterHammerParams;

/// Controls for a quasi-steady transient run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientConfig {
    /// Step size, s.
    pub time_step: f64,
    /// Hard cap on the number of steps, whatever the total time asks for.
    pub max_steps: usize,
    /// Stop early once consecutive steps differ by less than this pressure
    /// (Pa) and all events have finished. `None` always runs to the end.
    pub steady_tolerance: Option<f64>,
    /// Cavitation threshold, Pa. Water at 20 C by default.
    pub vapor_pressure: f64,
    pub hammer: WaterHammerParams,
    /// Per-step steady solve controls.
    pub method: SolverMethod,
    pub solver: SolverConfig,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            max_steps: 10_000,
            steady_tolerance: None,
            vapor_pressure: 2340.0,
            hammer: WaterHammerParams::default(),
            method: SolverMethod::default(),
            solver: SolverConfig::default(),
        }
    }
}
