//! Per-step snapshots and history queries.

use std::collections::{BTreeMap, BTreeSet};

use hn_core::{NodeId, PipeId};
use hn_solver::CorrectionStatus;

/// Snapshot of the solved network state at one simulation time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransientResult {
    /// 1-based step index.
    pub step: usize,
    /// Simulation time, s.
    pub time: f64,
    /// Solved node pressures, Pa. Unreachable nodes are absent.
    pub node_pressures: BTreeMap<NodeId, f64>,
    /// Signed pipe flows, m^3/s.
    pub pipe_flows: BTreeMap<PipeId, f64>,
    /// Flow velocity magnitudes through the nominal bore, m/s.
    pub pipe_velocities: BTreeMap<PipeId, f64>,
    /// Joukowsky surge per pipe whose velocity change crossed the
    /// detection threshold this step, Pa.
    pub surges: BTreeMap<PipeId, f64>,
    /// Largest entry of `surges`, zero when none.
    pub max_surge: f64,
    /// Lowest pressure of the step.
    pub min_pressure: Option<(NodeId, f64)>,
    /// Highest pressure of the step.
    pub max_pressure: Option<(NodeId, f64)>,
    /// Nodes below the vapor-pressure threshold.
    pub cavitating: BTreeSet<NodeId>,
    /// Loop-correction status of the underlying steady solve.
    pub status: CorrectionStatus,
}

/// (time, pressure) trace of one node across a run. Steps where the node
/// had no pressure are skipped.
pub fn pressure_history(results: &[TransientResult], node: NodeId) -> Vec<(f64, f64)> {
    results
        .iter()
        .filter_map(|r| r.node_pressures.get(&node).map(|&p| (r.time, p)))
        .collect()
}

/// (time, flow) trace of one pipe across a run.
pub fn flow_history(results: &[TransientResult], pipe: PipeId) -> Vec<(f64, f64)> {
    results
        .iter()
        .filter_map(|r| r.pipe_flows.get(&pipe).map(|&q| (r.time, q)))
        .collect()
}

/// (time, velocity) trace of one pipe across a run.
pub fn velocity_history(results: &[TransientResult], pipe: PipeId) -> Vec<(f64, f64)> {
    results
        .iter()
        .filter_map(|r| r.pipe_velocities.get(&pipe).map(|&v| (r.time, v)))
        .collect()
}

/// Largest surge seen anywhere across a run.
pub fn max_surge(results: &[TransientResult]) -> f64 {
    results.iter().fold(0.0, |acc, r| acc.max(r.max_surge))
}

/// Every (time, node) cavitation flag across a run, in step order.
pub fn cavitation_events(results: &[TransientResult]) -> Vec<(f64, NodeId)> {
    results
        .iter()
        .flat_map(|r| r.cavitating.iter().map(move |&n| (r.time, n)))
        .collect()
}
