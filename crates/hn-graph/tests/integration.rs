//! Integration tests for hn-graph.

use hn_core::{m, pa};
use hn_graph::{GraphError, Network, find_cycles};

#[test]
fn build_minimal_network() {
    // Build: A -> [AB] -> B
    let mut net = Network::new();
    let a = net.add_source("A", pa(2e5));
    let b = net.add_node("B");
    let ab = net.add_pipe("AB", a, b, m(100.0), m(0.05), m(4.5e-5)).unwrap();

    assert_eq!(net.node_count(), 2);
    assert_eq!(net.pipe_count(), 1);

    let pipe = net.pipe(ab).unwrap();
    assert_eq!(pipe.start, a);
    assert_eq!(pipe.end, b);
    assert!(pipe.flow.is_none());
    assert!(pipe.pressure_drop.is_none());
}

#[test]
fn topology_edits_change_cycle_count() {
    let mut net = Network::new();
    let a = net.add_node("A");
    let b = net.add_node("B");
    let c = net.add_node("C");
    net.add_pipe("AB", a, b, m(100.0), m(0.1), m(1e-4)).unwrap();
    net.add_pipe("BC", b, c, m(100.0), m(0.1), m(1e-4)).unwrap();
    assert_eq!(find_cycles(&net).len(), 0);

    // Closing the triangle adds exactly one cycle.
    let ca = net.add_pipe("CA", c, a, m(100.0), m(0.1), m(1e-4)).unwrap();
    assert_eq!(find_cycles(&net).len(), 1);

    // Cycles are derived data: removal brings the count straight back.
    net.remove_pipe(ca).unwrap();
    assert_eq!(find_cycles(&net).len(), 0);
}

#[test]
fn lookup_of_unknown_ids() {
    let mut net = Network::new();
    let a = net.add_node("A");
    let bogus = hn_core::NodeId::from_index(42);

    assert!(net.node(a).is_some());
    assert!(net.node(bogus).is_none());
    assert_eq!(
        net.remove_node(bogus).unwrap_err(),
        GraphError::NodeNotFound { node: bogus }
    );
}

#[test]
fn grid_network_cycle_rank() {
    // 3x3 grid: 9 nodes, 12 pipes, cycle rank = 12 - 9 + 1 = 4.
    let mut net = Network::new();
    let mut ids = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            ids.push(net.add_node(format!("N{row}{col}")));
        }
    }
    for row in 0..3 {
        for col in 0..3 {
            let i = row * 3 + col;
            if col < 2 {
                net.add_pipe(format!("H{row}{col}"), ids[i], ids[i + 1], m(100.0), m(0.1), m(1e-4))
                    .unwrap();
            }
            if row < 2 {
                net.add_pipe(format!("V{row}{col}"), ids[i], ids[i + 3], m(100.0), m(0.1), m(1e-4))
                    .unwrap();
            }
        }
    }

    assert_eq!(net.pipe_count(), 12);
    assert_eq!(find_cycles(&net).len(), 4);
}
