//! Quasi-steady transient integration.

use std::collections::{BTreeMap, BTreeSet};

use hn_core::{NodeId, PipeId, m3ps, pa};
use hn_graph::Network;
use hn_hydraulics::{Fluid, PressureModel};
use hn_solver::NetworkSolver;
use tracing::{info, warn};

use crate::config::TransientConfig;
use crate::error::{SimResult, TransientError};
use crate::events::{EventKind, EventTarget, TransientEvent};
use crate::result::TransientResult;
use crate::water_hammer::joukowsky_surge;

/// Velocity changes below this do not count as surges, m/s.
const SURGE_VELOCITY_THRESHOLD: f64 = 0.01;

/// Steps a network through time as a sequence of steady solves.
///
/// Each step advances the clock, applies the scheduled events at the new
/// time and re-solves the network. Surge pressures are estimated from the
/// step-over-step velocity change of every pipe; the flow itself is assumed
/// to settle within the step (quasi-steady), so the step size should be
/// long against the acoustic round-trip time of the pipes.
pub struct TransientSolver {
    pub config: TransientConfig,
}

impl TransientSolver {
    pub fn new(config: TransientConfig) -> Self {
        Self { config }
    }

    /// Run without an observer.
    pub fn run(
        &self,
        network: &mut Network,
        model: &dyn PressureModel,
        fluid: &Fluid,
        events: &[TransientEvent],
        total_time: f64,
    ) -> SimResult<Vec<TransientResult>> {
        self.run_with_observer(network, model, fluid, events, total_time, |_| {})
    }

    /// Run, handing every snapshot to `observer` as it is recorded.
    ///
    /// Observers see the snapshot only, never the network, so they cannot
    /// perturb the run.
    pub fn run_with_observer<F>(
        &self,
        network: &mut Network,
        model: &dyn PressureModel,
        fluid: &Fluid,
        events: &[TransientEvent],
        total_time: f64,
        mut observer: F,
    ) -> SimResult<Vec<TransientResult>>
    where
        F: FnMut(&TransientResult),
    {
        let dt = self.config.time_step;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(TransientError::BadTimeStep { value: dt });
        }
        if !(total_time.is_finite() && total_time > 0.0) {
            return Err(TransientError::BadTotalTime { value: total_time });
        }
        if network.node_count() == 0 {
            return Err(TransientError::EmptyNetwork);
        }

        let solver = NetworkSolver::new(model, fluid)
            .with_config(self.config.solver)
            .with_method(self.config.method);

        // Equipment baselines; pump ramps are fractions of these.
        let ratio_base: BTreeMap<NodeId, f64> = network
            .nodes()
            .filter_map(|n| n.pressure_ratio.map(|r| (n.id, r)))
            .collect();
        let mult_base: BTreeMap<PipeId, f64> =
            network.pipes().map(|p| (p.id, p.pump_multiplier)).collect();

        // Baseline solve so the first step has velocities to diff against.
        solver.solve(network)?;
        let mut prev_velocities: BTreeMap<PipeId, f64> =
            network.pipes().map(|p| (p.id, p.velocity())).collect();

        let rho = fluid.effective_density();
        let mut results: Vec<TransientResult> = Vec::new();
        let mut t = 0.0;
        info!(dt, total_time, "transient run");

        for step in 1..=self.config.max_steps {
            if t >= total_time - 1e-12 {
                break;
            }
            t += dt;

            self.apply_events(network, events, t, &ratio_base, &mult_base);
            let outcome = solver.solve(network)?;

            let node_pressures: BTreeMap<NodeId, f64> = network
                .nodes()
                .filter_map(|n| n.pressure.map(|p| (n.id, p.value)))
                .collect();
            let pipe_flows: BTreeMap<PipeId, f64> = network
                .pipes()
                .map(|p| (p.id, p.flow.map_or(0.0, |q| q.value)))
                .collect();
            let pipe_velocities: BTreeMap<PipeId, f64> =
                network.pipes().map(|p| (p.id, p.velocity())).collect();

            let mut surges = BTreeMap::new();
            let mut max_surge = 0.0f64;
            for (&pid, &v) in &pipe_velocities {
                let dv = v - prev_velocities.get(&pid).copied().unwrap_or(0.0);
                if dv.abs() < SURGE_VELOCITY_THRESHOLD {
                    continue;
                }
                let d = network.pipe(pid).map_or(0.0, |p| p.diameter.value);
                let surge = joukowsky_surge(rho, self.config.hammer.speed(rho, d), dv);
                max_surge = max_surge.max(surge);
                surges.insert(pid, surge);
            }

            let min_pressure = node_pressures
                .iter()
                .map(|(&n, &p)| (n, p))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let max_pressure = node_pressures
                .iter()
                .map(|(&n, &p)| (n, p))
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let cavitating: BTreeSet<NodeId> = node_pressures
                .iter()
                .filter(|&(_, &p)| p < self.config.vapor_pressure)
                .map(|(&n, _)| n)
                .collect();
            if !cavitating.is_empty() {
                warn!(time = t, count = cavitating.len(), "pressure below vapor threshold");
            }

            let settled = match (self.config.steady_tolerance, results.last()) {
                (Some(tol), Some(prev)) => {
                    events.iter().all(|e| t >= e.end())
                        && max_pressure_delta(prev, &node_pressures) < tol
                }
                _ => false,
            };

            prev_velocities = pipe_velocities.clone();
            let snapshot = TransientResult {
                step,
                time: t,
                node_pressures,
                pipe_flows,
                pipe_velocities,
                surges,
                max_surge,
                min_pressure,
                max_pressure,
                cavitating,
                status: outcome.status,
            };
            observer(&snapshot);
            results.push(snapshot);

            if settled {
                info!(time = t, "transient settled early");
                break;
            }
        }
        Ok(results)
    }

    fn apply_events(
        &self,
        network: &mut Network,
        events: &[TransientEvent],
        t: f64,
        ratio_base: &BTreeMap<NodeId, f64>,
        mult_base: &BTreeMap<PipeId, f64>,
    ) {
        for ev in events {
            if t < ev.start {
                continue;
            }
            let value = ev.value_at(t);
            match (ev.target, ev.kind) {
                (EventTarget::Pipe(id), EventKind::ValveOpening) => {
                    if let Some(pipe) = network.pipe_mut(id) {
                        pipe.valve_opening = value.clamp(0.0, 1.0);
                    } else {
                        warn!(pipe = %id, "valve event on unknown pipe");
                    }
                }
                (EventTarget::Pipe(id), EventKind::PumpRamp) => {
                    let base = mult_base.get(&id).copied().unwrap_or(1.0);
                    if let Some(pipe) = network.pipe_mut(id) {
                        pipe.pump_multiplier = base * value.max(0.0);
                    } else {
                        warn!(pipe = %id, "pump event on unknown pipe");
                    }
                }
                (EventTarget::Node(id), EventKind::PumpRamp) => {
                    let base = ratio_base.get(&id).copied().unwrap_or(1.0);
                    if let Some(node) = network.node_mut(id) {
                        node.pressure_ratio = Some(1.0 + (base - 1.0) * value.max(0.0));
                    } else {
                        warn!(node = %id, "pump event on unknown node");
                    }
                }
                (EventTarget::Node(id), EventKind::DemandChange) => {
                    if let Some(node) = network.node_mut(id) {
                        node.demand = Some(m3ps(value));
                        node.is_sink = true;
                    } else {
                        warn!(node = %id, "demand event on unknown node");
                    }
                }
                (EventTarget::Node(id), EventKind::PressureChange) => {
                    if let Some(node) = network.node_mut(id) {
                        node.fixed_pressure = Some(pa(value));
                        node.is_source = true;
                    } else {
                        warn!(node = %id, "pressure event on unknown node");
                    }
                }
                (target, kind) => {
                    warn!(?target, ?kind, "event kind does not apply to this target");
                }
            }
        }
    }
}

/// Largest node-pressure change between a recorded step and the current
/// pressures. Nodes absent from either side are ignored.
fn max_pressure_delta(prev: &TransientResult, pressures: &BTreeMap<NodeId, f64>) -> f64 {
    let mut delta = 0.0f64;
    for (node, p) in pressures {
        if let Some(before) = prev.node_pressures.get(node) {
            delta = delta.max((p - before).abs());
        }
    }
    delta
}
