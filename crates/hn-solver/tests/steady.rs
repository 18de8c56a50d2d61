//! End-to-end steady-state solves.

use std::collections::BTreeMap;

use hn_core::{NodeId, m, m3ps, pa};
use hn_graph::{Network, Node, Pipe};
use hn_hydraulics::{DarcyWeisbach, Fluid, HydResult, PressureModel};
use hn_solver::{CorrectionStatus, NetworkSolver, SolverError, SolverMethod};

/// Test model: fixed drop magnitude, independent of flow. Its loop-flow
/// derivative is zero everywhere, which makes loop systems singular.
struct ConstantDrop {
    dp: f64,
}

impl PressureModel for ConstantDrop {
    fn pipe_drop(&self, _pipe: &Pipe, _fluid: &Fluid, flow: f64) -> HydResult<f64> {
        Ok(if flow < 0.0 { -self.dp } else { self.dp })
    }

    fn node_gain(&self, _node: &Node, _inlet_pressure: f64) -> f64 {
        0.0
    }

    fn valve_loss(&self, _k: f64, _pipe: &Pipe, _fluid: &Fluid, _flow: f64) -> f64 {
        0.0
    }
}

fn add_pipe(net: &mut Network, name: &str, a: NodeId, b: NodeId, length: f64) -> hn_core::PipeId {
    net.add_pipe(name, a, b, m(length), m(0.1), m(1e-4)).unwrap()
}

/// Asymmetric square loop behind a supply tail. The uneven branch lengths
/// make the equal demand split wrong, so the correctors genuinely iterate.
fn looped_network() -> Network {
    let mut net = Network::new();
    let s = net.add_source("S", pa(5e5));
    let a = net.add_node("A");
    let b = net.add_node("B");
    let c = net.add_sink("C", m3ps(0.01));
    let d = net.add_node("D");
    add_pipe(&mut net, "SA", s, a, 50.0);
    add_pipe(&mut net, "AB", a, b, 100.0);
    add_pipe(&mut net, "BC", b, c, 50.0);
    add_pipe(&mut net, "AD", a, d, 200.0);
    add_pipe(&mut net, "DC", d, c, 60.0);
    net
}

fn node_pressures(net: &Network) -> BTreeMap<NodeId, f64> {
    net.nodes()
        .map(|n| (n.id, n.pressure.expect("solved").value))
        .collect()
}

#[test]
fn missing_pressure_source_is_rejected_up_front() {
    let mut net = Network::new();
    let a = net.add_node("A");
    let b = net.add_sink("B", m3ps(0.01));
    add_pipe(&mut net, "AB", a, b, 100.0);

    let fluid = Fluid::water();
    let model = DarcyWeisbach::default();
    let err = NetworkSolver::new(&model, &fluid)
        .solve(&mut net)
        .unwrap_err();
    assert!(matches!(err, SolverError::NoPressureSource));
}

#[test]
fn single_pipe_propagates_exactly() {
    let mut net = Network::new();
    let a = net.add_source("A", pa(5e5));
    let b = net.add_sink("B", m3ps(0.01));
    let ab = add_pipe(&mut net, "AB", a, b, 100.0);

    let fluid = Fluid::water();
    let model = ConstantDrop { dp: 1234.0 };
    let outcome = NetworkSolver::new(&model, &fluid).solve(&mut net).unwrap();

    assert_eq!(
        outcome.status,
        CorrectionStatus::Converged { iterations: 0 },
        "a tree needs no loop correction"
    );
    assert!(outcome.unreachable.is_empty());
    assert!((net.pipe(ab).unwrap().flow.unwrap().value - 0.01).abs() < 1e-12);
    assert_eq!(net.pipe(ab).unwrap().pressure_drop, Some(pa(1234.0)));
    assert_eq!(net.node(b).unwrap().pressure, Some(pa(5e5 - 1234.0)));
}

#[test]
fn tree_solve_is_idempotent() {
    let mut net = Network::new();
    let s = net.add_source("S", pa(4e5));
    let j = net.add_node("J");
    let b = net.add_sink("B", m3ps(0.01));
    let c = net.add_sink("C", m3ps(0.005));
    add_pipe(&mut net, "SJ", s, j, 100.0);
    add_pipe(&mut net, "JB", j, b, 80.0);
    add_pipe(&mut net, "JC", j, c, 120.0);

    let fluid = Fluid::water();
    let model = DarcyWeisbach::default();
    let solver = NetworkSolver::new(&model, &fluid);

    solver.solve(&mut net).unwrap();
    let first = node_pressures(&net);
    solver.solve(&mut net).unwrap();
    let second = node_pressures(&net);

    // Bit-identical: same inputs, same traversal order, same arithmetic.
    assert_eq!(first, second);
}

#[test]
fn looped_network_converges_and_balances() {
    let fluid = Fluid::water();
    let model = DarcyWeisbach::default();

    let mut net = looped_network();
    let outcome = NetworkSolver::new(&model, &fluid)
        .with_method(SolverMethod::HardyCross)
        .solve(&mut net)
        .unwrap();

    assert!(outcome.status.is_converged(), "{:?}", outcome.status);
    assert!(outcome.unreachable.is_empty());

    // Loop corrections preserve the balanced seed at every junction.
    for node in net.node_ids() {
        let n = net.node(node).unwrap();
        if n.is_source || n.is_sink {
            continue;
        }
        assert!(net.net_inflow(node).abs() < 1e-9, "junction {node}");
    }
    let sink = net.nodes().find(|n| n.is_sink).unwrap().id;
    assert!((net.net_inflow(sink) - 0.01).abs() < 1e-9);

    // The shorter branch carries more of the demand.
    let q_short = net.pipes().find(|p| p.name == "AB").unwrap().flow.unwrap();
    let q_long = net.pipes().find(|p| p.name == "AD").unwrap().flow.unwrap();
    assert!(q_short.value > q_long.value);
    assert!(q_short.value > 0.0 && q_long.value > 0.0);
}

#[test]
fn both_methods_agree_on_the_loop() {
    let fluid = Fluid::water();
    let model = DarcyWeisbach::default();

    let mut hc = looped_network();
    let mut nr = looped_network();
    let hc_out = NetworkSolver::new(&model, &fluid)
        .with_method(SolverMethod::HardyCross)
        .solve(&mut hc)
        .unwrap();
    let nr_out = NetworkSolver::new(&model, &fluid)
        .with_method(SolverMethod::NewtonRaphson)
        .solve(&mut nr)
        .unwrap();

    assert!(hc_out.status.is_converged());
    assert!(nr_out.status.is_converged());

    let p_hc = node_pressures(&hc);
    let p_nr = node_pressures(&nr);
    for (node, p) in &p_hc {
        assert!(
            (p - p_nr[node]).abs() < 1.0,
            "node {node}: {p} vs {}",
            p_nr[node]
        );
    }
}

#[test]
fn flow_independent_loop_is_singular_for_newton() {
    // Triangle at rest with a drop model whose derivative is zero: there is
    // no linearization to correct against.
    let mut net = Network::new();
    let a = net.add_source("A", pa(2e5));
    let b = net.add_node("B");
    let c = net.add_node("C");
    add_pipe(&mut net, "AB", a, b, 100.0);
    add_pipe(&mut net, "BC", b, c, 100.0);
    add_pipe(&mut net, "CA", c, a, 100.0);

    let fluid = Fluid::water();
    let model = ConstantDrop { dp: 500.0 };

    let outcome = NetworkSolver::new(&model, &fluid)
        .with_method(SolverMethod::NewtonRaphson)
        .solve(&mut net)
        .unwrap();
    assert_eq!(outcome.status, CorrectionStatus::SingularSystem);

    // Hardy-Cross has no global system to declare singular; it skips the
    // dead loop every sweep and runs out of iterations instead.
    let outcome = NetworkSolver::new(&model, &fluid)
        .with_method(SolverMethod::HardyCross)
        .solve(&mut net)
        .unwrap();
    assert!(matches!(
        outcome.status,
        CorrectionStatus::IterationCapReached { .. }
    ));
}

#[test]
fn disconnected_nodes_are_reported_not_fatal() {
    let mut net = Network::new();
    let s = net.add_source("S", pa(3e5));
    let a = net.add_sink("A", m3ps(0.002));
    add_pipe(&mut net, "SA", s, a, 100.0);
    let x = net.add_node("X");

    let fluid = Fluid::water();
    let model = DarcyWeisbach::default();
    let outcome = NetworkSolver::new(&model, &fluid).solve(&mut net).unwrap();

    assert_eq!(outcome.unreachable, vec![x]);
    assert!(net.node(a).unwrap().pressure.is_some());
    assert!(net.node(x).unwrap().pressure.is_none());
}
