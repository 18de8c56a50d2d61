//! Flow seeding and pressure propagation.

use std::collections::{BTreeMap, VecDeque};

use hn_core::{NodeId, PipeId, m3ps, pa};
use hn_graph::Network;
use hn_hydraulics::{Fluid, PressureModel};
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};

/// Flow parcels below this rate are dropped during seeding.
const MIN_PARCEL: f64 = 1e-12;

/// Nodes that ended a propagation pass without a pressure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub unreachable: Vec<NodeId>,
}

/// Seed pipe flows from sink demands.
///
/// Each sink's demand is split equally over the pipes oriented into it and
/// every split share is pushed further upstream the same way, stopping at
/// source nodes. Splitting the share (rather than the full demand) keeps the
/// seed balanced at every junction, and loop corrections preserve that
/// balance. Pipes left untouched by every walk start at rest.
pub fn initialize_flows_from_demands(network: &mut Network) {
    let mut contributions: BTreeMap<PipeId, f64> = BTreeMap::new();
    // Parcels only ever split, so a generous cap terminates re-converging
    // walks without cutting any realistic topology short.
    let step_cap = (network.node_count() * network.pipe_count() * 64).max(1024);

    for node_id in network.node_ids() {
        let demand = match network.node(node_id) {
            Some(n) if n.is_sink => n.demand.map_or(0.0, |d| d.value),
            _ => 0.0,
        };
        if demand == 0.0 {
            continue;
        }

        let mut steps_left = step_cap;
        let mut queue = VecDeque::from([(node_id, demand)]);
        while let Some((at, flow)) = queue.pop_front() {
            if flow.abs() < MIN_PARCEL {
                continue;
            }
            if steps_left == 0 {
                warn!(node = %node_id, "flow seeding walk cut short");
                break;
            }
            steps_left -= 1;

            let feeders: Vec<PipeId> = network.pipes_into(at).iter().map(|p| p.id).collect();
            if feeders.is_empty() {
                continue;
            }
            let share = flow / feeders.len() as f64;
            for pid in feeders {
                *contributions.entry(pid).or_insert(0.0) += share;
                let upstream = network.pipe(pid).map(|p| p.start);
                if let Some(up) = upstream {
                    let at_source = network.node(up).is_some_and(|n| n.is_source);
                    if !at_source {
                        queue.push_back((up, share));
                    }
                }
            }
        }
    }

    debug!(seeded = contributions.len(), "demand flow seeding");
    for (pid, q) in contributions {
        if let Some(pipe) = network.pipe_mut(pid) {
            pipe.flow = Some(m3ps(q));
        }
    }
    for pid in network.pipe_ids() {
        if let Some(pipe) = network.pipe_mut(pid) {
            if pipe.flow.is_none() {
                pipe.flow = Some(m3ps(0.0));
            }
        }
    }
}

/// Propagate pressures outward from every fixed-pressure node.
///
/// Every pipe's signed drop is evaluated once at its current flow and
/// stored on the pipe. The frontier then walks the topology breadth-first,
/// assigning `p_neighbor = p_here - drop` with the drop sign flipped when
/// the pipe is traversed against its orientation. An already-assigned
/// pressure is never overwritten, so fixed boundaries always win. Pump
/// nodes record their discharge pressure and expand forward with it, while
/// backward traversal stays on the suction side; valve nodes likewise
/// charge their K loss only on pipes oriented away from the frontier.
pub fn propagate_pressures(
    network: &mut Network,
    model: &dyn PressureModel,
    fluid: &Fluid,
) -> SolverResult<PropagationReport> {
    let mut drops: BTreeMap<PipeId, f64> = BTreeMap::new();
    for pid in network.pipe_ids() {
        let pipe = network
            .pipe(pid)
            .ok_or(SolverError::MissingPipe { pipe: pid })?;
        let q = pipe.flow.map_or(0.0, |q| q.value);
        drops.insert(pid, model.pipe_drop(pipe, fluid, q)?);
    }
    for (&pid, &dp) in &drops {
        if let Some(pipe) = network.pipe_mut(pid) {
            pipe.pressure_drop = Some(pa(dp));
        }
    }

    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for nid in network.node_ids() {
        if let Some(node) = network.node_mut(nid) {
            if let Some(p) = node.fixed_pressure {
                node.pressure = Some(p);
                queue.push_back(nid);
            }
        }
    }
    if queue.is_empty() {
        return Err(SolverError::NoPressureSource);
    }

    while let Some(u) = queue.pop_front() {
        let node = network
            .node(u)
            .ok_or(SolverError::MissingNode { node: u })?;
        let Some(pressure) = node.pressure else {
            continue;
        };
        let suction = pressure.value;

        // Pump nodes record their discharge pressure; a fixed boundary
        // pressure is left untouched. The suction value is kept for the
        // pipes that feed the node.
        let gain = model.node_gain(node, suction);
        let discharge = if gain != 0.0 && node.fixed_pressure.is_none() {
            let boosted = suction + gain;
            if let Some(n) = network.node_mut(u) {
                n.pressure = Some(pa(boosted));
            }
            boosted
        } else {
            suction
        };
        let valve_k = network
            .node(u)
            .and_then(|n| if n.is_valve { n.valve_k } else { None });

        let neighbors: Vec<(PipeId, NodeId, bool)> = network
            .pipes_at(u)
            .iter()
            .filter_map(|p| p.other_end(u).map(|v| (p.id, v, p.start == u)))
            .collect();
        for (pid, v, forward) in neighbors {
            if network.node(v).and_then(|n| n.pressure).is_some() {
                continue;
            }
            let pipe = network
                .pipe(pid)
                .ok_or(SolverError::MissingPipe { pipe: pid })?;
            let q = pipe.flow.map_or(0.0, |f| f.value);
            let mut dp = drops[&pid];
            // Node equipment sits between the node and its outgoing pipes,
            // so only forward traversal sees the boost and the valve loss.
            let p_here = if forward {
                if let Some(k) = valve_k {
                    dp += model.valve_loss(k, pipe, fluid, q);
                }
                discharge
            } else {
                dp = -dp;
                suction
            };
            if let Some(n) = network.node_mut(v) {
                n.pressure = Some(pa(p_here - dp));
            }
            queue.push_back(v);
        }
    }

    let unreachable: Vec<NodeId> = network
        .nodes()
        .filter(|n| n.pressure.is_none())
        .map(|n| n.id)
        .collect();
    if !unreachable.is_empty() {
        warn!(
            count = unreachable.len(),
            "nodes unreachable from any pressure source"
        );
    }
    Ok(PropagationReport { unreachable })
}
