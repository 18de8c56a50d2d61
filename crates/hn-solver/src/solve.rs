//! Steady-state solve orchestration.

use hn_core::NodeId;
use hn_graph::{Network, find_cycles};
use hn_hydraulics::{Fluid, PressureModel};
use tracing::info;

use crate::config::SolverConfig;
use crate::correction::{CorrectionStatus, LoopCorrector};
use crate::error::{SolverError, SolverResult};
use crate::hardy_cross::HardyCross;
use crate::newton::NewtonRaphson;
use crate::propagation::{initialize_flows_from_demands, propagate_pressures};

/// Loop-correction scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverMethod {
    HardyCross,
    #[default]
    NewtonRaphson,
}

/// Result of a full solve pass. Unreachable nodes and non-converged loop
/// corrections are reported here rather than raised: the partial solution
/// on the reachable part of the network is still valid.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: CorrectionStatus,
    pub unreachable: Vec<NodeId>,
}

/// Orchestrates one steady-state pass over a network: demand flow seeding,
/// loop correction, then pressure propagation.
pub struct NetworkSolver<'a> {
    pub model: &'a dyn PressureModel,
    pub fluid: &'a Fluid,
    pub config: SolverConfig,
    pub method: SolverMethod,
}

impl<'a> NetworkSolver<'a> {
    pub fn new(model: &'a dyn PressureModel, fluid: &'a Fluid) -> Self {
        Self {
            model,
            fluid,
            config: SolverConfig::default(),
            method: SolverMethod::default(),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_method(mut self, method: SolverMethod) -> Self {
        self.method = method;
        self
    }

    /// Solve the network in place.
    ///
    /// Previously solved pressures and drops are cleared first; flows are
    /// re-seeded from the current demands, with flows on pipes outside every
    /// demand path kept as a warm start for the loop correction. A network
    /// with no fixed-pressure node is rejected before any iteration runs.
    pub fn solve(&self, network: &mut Network) -> SolverResult<SolveOutcome> {
        if !network.nodes().any(|n| n.fixed_pressure.is_some()) {
            return Err(SolverError::NoPressureSource);
        }

        network.clear_pressures();
        initialize_flows_from_demands(network);

        let cycles = find_cycles(network);
        info!(cycles = cycles.len(), method = ?self.method, "steady-state solve");
        let status = if cycles.is_empty() {
            // A forest is fixed entirely by the demand seed.
            CorrectionStatus::Converged { iterations: 0 }
        } else {
            match self.method {
                SolverMethod::HardyCross => {
                    HardyCross.correct(network, &cycles, self.model, self.fluid, &self.config)?
                }
                SolverMethod::NewtonRaphson => NewtonRaphson::default().correct(
                    network,
                    &cycles,
                    self.model,
                    self.fluid,
                    &self.config,
                )?,
            }
        };

        let report = propagate_pressures(network, self.model, self.fluid)?;
        Ok(SolveOutcome {
            status,
            unreachable: report.unreachable,
        })
    }
}
