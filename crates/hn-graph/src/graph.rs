//! Core network data structures.
//!
//! Nodes and pipes reference each other by identifier only; all
//! cross-references are resolved through the `Network` lookup at use time.

use std::collections::BTreeMap;

use hn_core::{Length, NodeId, PipeId, Pressure, VolumeRate};

use crate::equipment::{PumpCurve, Valve};
use crate::error::GraphError;

/// A junction or boundary point in the network.
///
/// Boundary conditions live in `fixed_pressure` (source) and `demand` (sink).
/// The solved pressure is `None` until a solve pass assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Elevation above datum (reserved for static-head extensions).
    pub elevation: Length,
    /// Fixed boundary pressure (source nodes).
    pub fixed_pressure: Option<Pressure>,
    /// Fixed boundary draw-off (sink nodes), positive = out of the network.
    pub demand: Option<VolumeRate>,
    pub is_source: bool,
    pub is_sink: bool,
    pub is_pump: bool,
    pub is_valve: bool,
    /// Discharge/suction pressure ratio for pump nodes.
    pub pressure_ratio: Option<f64>,
    /// Loss coefficient K for valve nodes.
    pub valve_k: Option<f64>,
    /// Solved pressure, written by the solver.
    pub pressure: Option<Pressure>,
}

impl Node {
    fn new(id: NodeId, name: String) -> Self {
        Self {
            id,
            name,
            elevation: hn_core::m(0.0),
            fixed_pressure: None,
            demand: None,
            is_source: false,
            is_sink: false,
            is_pump: false,
            is_valve: false,
            pressure_ratio: None,
            valve_k: None,
            pressure: None,
        }
    }
}

/// A pipe segment between two nodes.
///
/// Orientation (`start` -> `end`) fixes the sign convention: positive flow
/// runs start to end. Flow and pressure drop are `None` until solved.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub id: PipeId,
    pub name: String,
    pub start: NodeId,
    pub end: NodeId,
    pub length: Length,
    pub diameter: Length,
    /// Absolute surface roughness.
    pub roughness: Length,
    pub pump_curve: Option<PumpCurve>,
    pub valve: Option<Valve>,
    /// Valve opening fraction, 1.0 = fully open. Scales effective flow area.
    pub valve_opening: f64,
    /// Pump head-gain multiplier, 1.0 = nominal. Scaled by pump-ramp events.
    pub pump_multiplier: f64,
    /// Solved flow rate, signed: positive = start -> end.
    pub flow: Option<VolumeRate>,
    /// Solved pressure drop, signed like the flow: `p_end = p_start - drop`.
    pub pressure_drop: Option<Pressure>,
}

impl Pipe {
    /// Nominal cross-sectional area in m^2.
    pub fn area(&self) -> f64 {
        let d = self.diameter.value;
        std::f64::consts::PI * d * d / 4.0
    }

    /// Effective diameter in m, with the valve opening scaling flow area.
    ///
    /// The opening is clamped to 1% so a fully closed valve still leaves a
    /// numerically solvable restriction.
    pub fn effective_diameter(&self) -> f64 {
        let opening = self.valve_opening.clamp(0.01, 1.0);
        self.diameter.value * opening.sqrt()
    }

    /// Effective cross-sectional area in m^2 after valve restriction.
    pub fn effective_area(&self) -> f64 {
        let d = self.effective_diameter();
        std::f64::consts::PI * d * d / 4.0
    }

    /// Mean flow velocity magnitude in m/s for the solved flow, through the
    /// nominal cross-section. Valve restriction enters the friction model,
    /// not the transport velocity, so a closing valve shows up here as the
    /// flow collapsing rather than as an area artifact.
    pub fn velocity(&self) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.flow.map_or(0.0, |q| q.value.abs() / area)
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint at all.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if node == self.start {
            Some(self.end)
        } else if node == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}

/// The network: identifier-keyed nodes and pipes.
///
/// Storage is ordered by id so every traversal (adjacency, cycle search,
/// propagation frontier) visits elements in a stable, reproducible order.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: BTreeMap<NodeId, Node>,
    pipes: BTreeMap<PipeId, Pipe>,
    next_node: u32,
    next_pipe: u32,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------- Nodes ----------

    /// Add a plain junction node and return its id.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, Node::new(id, name.into()));
        id
    }

    /// Add a source node with a fixed boundary pressure.
    pub fn add_source(&mut self, name: impl Into<String>, pressure: Pressure) -> NodeId {
        let id = self.add_node(name);
        let node = self.nodes.get_mut(&id).expect("node just inserted");
        node.is_source = true;
        node.fixed_pressure = Some(pressure);
        id
    }

    /// Add a sink node with a fixed demand.
    pub fn add_sink(&mut self, name: impl Into<String>, demand: VolumeRate) -> NodeId {
        let id = self.add_node(name);
        let node = self.nodes.get_mut(&id).expect("node just inserted");
        node.is_sink = true;
        node.demand = Some(demand);
        id
    }

    /// Remove a node. Fails while pipes still reference it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound { node: id });
        }
        if self.pipes.values().any(|p| p.start == id || p.end == id) {
            return Err(GraphError::NodeInUse { node: id });
        }
        Ok(self.nodes.remove(&id).expect("checked above"))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Node ids in order, collected (safe to hold across mutation).
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ---------- Pipes ----------

    /// Add a pipe between two existing nodes and return its id.
    pub fn add_pipe(
        &mut self,
        name: impl Into<String>,
        start: NodeId,
        end: NodeId,
        length: Length,
        diameter: Length,
        roughness: Length,
    ) -> Result<PipeId, GraphError> {
        if start == end {
            return Err(GraphError::SelfLoop);
        }
        for endpoint in [start, end] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(GraphError::EndpointMissing { node: endpoint });
            }
        }
        let id = PipeId::from_index(self.next_pipe);
        self.next_pipe += 1;
        self.pipes.insert(
            id,
            Pipe {
                id,
                name: name.into(),
                start,
                end,
                length,
                diameter,
                roughness,
                pump_curve: None,
                valve: None,
                valve_opening: 1.0,
                pump_multiplier: 1.0,
                flow: None,
                pressure_drop: None,
            },
        );
        Ok(id)
    }

    pub fn remove_pipe(&mut self, id: PipeId) -> Result<Pipe, GraphError> {
        self.pipes
            .remove(&id)
            .ok_or(GraphError::PipeNotFound { pipe: id })
    }

    pub fn pipe(&self, id: PipeId) -> Option<&Pipe> {
        self.pipes.get(&id)
    }

    pub fn pipe_mut(&mut self, id: PipeId) -> Option<&mut Pipe> {
        self.pipes.get_mut(&id)
    }

    /// Pipes in id order.
    pub fn pipes(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.values()
    }

    /// Pipe ids in order, collected (safe to hold across mutation).
    pub fn pipe_ids(&self) -> Vec<PipeId> {
        self.pipes.keys().copied().collect()
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    // ---------- Adjacency ----------

    /// Pipes oriented out of `node`, in pipe-id order.
    pub fn pipes_from(&self, node: NodeId) -> Vec<&Pipe> {
        self.pipes.values().filter(|p| p.start == node).collect()
    }

    /// Pipes oriented into `node`, in pipe-id order.
    pub fn pipes_into(&self, node: NodeId) -> Vec<&Pipe> {
        self.pipes.values().filter(|p| p.end == node).collect()
    }

    /// All pipes incident to `node`, in pipe-id order.
    pub fn pipes_at(&self, node: NodeId) -> Vec<&Pipe> {
        self.pipes
            .values()
            .filter(|p| p.start == node || p.end == node)
            .collect()
    }

    /// Net solved inflow at a node in m^3/s (unset flows count as zero).
    ///
    /// Junction nodes of a converged solution balance to ~zero; sinks show
    /// their demand, sources the total delivered flow.
    pub fn net_inflow(&self, node: NodeId) -> f64 {
        let mut sum = 0.0;
        for pipe in self.pipes.values() {
            let q = pipe.flow.map_or(0.0, |q| q.value);
            if pipe.end == node {
                sum += q;
            } else if pipe.start == node {
                sum -= q;
            }
        }
        sum
    }

    // ---------- Solution lifecycle ----------

    /// Reset solved node pressures and pipe pressure drops for a re-solve
    /// pass. Flows are kept: they seed the next loop correction.
    pub fn clear_pressures(&mut self) {
        for node in self.nodes.values_mut() {
            node.pressure = None;
        }
        for pipe in self.pipes.values_mut() {
            pipe.pressure_drop = None;
        }
    }

    /// Reset every solved field, flows included.
    pub fn clear_solution(&mut self) {
        self.clear_pressures();
        for pipe in self.pipes.values_mut() {
            pipe.flow = None;
        }
    }
}
