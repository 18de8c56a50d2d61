//! Fundamental cycle detection.
//!
//! Builds a BFS spanning forest over the undirected topology; every pipe
//! left out of the forest (a chord) closes exactly one fundamental cycle,
//! recovered by walking both chord endpoints up to their lowest common
//! ancestor. Traversal visits nodes and neighbor pipes in id order so the
//! cycle set and sign assignment are reproducible across runs.

use std::collections::{HashMap, HashSet, VecDeque};

use hn_core::{NodeId, PipeId};

use crate::graph::Network;

/// One independent loop: ordered (pipe, sign) steps forming a closed walk.
///
/// The sign is +1 when the walk traverses the pipe along its stored
/// orientation (start -> end), -1 against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub steps: Vec<(PipeId, i8)>,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, pipe: PipeId) -> bool {
        self.steps.iter().any(|&(p, _)| p == pipe)
    }
}

/// Find all fundamental cycles in the network.
///
/// A forest (no chords) yields an empty set. Disconnected components are
/// spanned independently; pipes in different components never share a cycle.
pub fn find_cycles(network: &Network) -> Vec<Cycle> {
    // parent[child] = (parent node, tree pipe linking them)
    let mut parent: HashMap<NodeId, (NodeId, PipeId)> = HashMap::new();
    let mut depth: HashMap<NodeId, u32> = HashMap::new();
    let mut tree_pipes: HashSet<PipeId> = HashSet::new();

    for root in network.node_ids() {
        if depth.contains_key(&root) {
            continue;
        }
        depth.insert(root, 0);
        let mut queue = VecDeque::from([root]);
        while let Some(u) = queue.pop_front() {
            let u_depth = depth[&u];
            for pipe in network.pipes_at(u) {
                let v = pipe.other_end(u).expect("incident pipe has u as endpoint");
                if depth.contains_key(&v) {
                    continue;
                }
                depth.insert(v, u_depth + 1);
                parent.insert(v, (u, pipe.id));
                tree_pipes.insert(pipe.id);
                queue.push_back(v);
            }
        }
    }

    let mut cycles = Vec::new();
    for chord in network.pipes() {
        if tree_pipes.contains(&chord.id) {
            continue;
        }
        cycles.push(close_cycle(network, chord.id, &parent, &depth));
    }
    cycles
}

/// Stitch the chord and the two tree paths to the LCA into one closed walk.
fn close_cycle(
    network: &Network,
    chord: PipeId,
    parent: &HashMap<NodeId, (NodeId, PipeId)>,
    depth: &HashMap<NodeId, u32>,
) -> Cycle {
    let pipe = network.pipe(chord).expect("chord exists");
    let (u, v) = (pipe.start, pipe.end);

    // Walk both endpoints up to equal depth, then in lockstep to the LCA,
    // recording (pipe, from, to) for each child -> parent step.
    let mut up_u: Vec<(PipeId, NodeId, NodeId)> = Vec::new();
    let mut up_v: Vec<(PipeId, NodeId, NodeId)> = Vec::new();
    let (mut a, mut b) = (u, v);

    while depth[&a] > depth[&b] {
        let (pa, pe) = parent[&a];
        up_u.push((pe, a, pa));
        a = pa;
    }
    while depth[&b] > depth[&a] {
        let (pb, pe) = parent[&b];
        up_v.push((pe, b, pb));
        b = pb;
    }
    while a != b {
        let (pa, pe_a) = parent[&a];
        up_u.push((pe_a, a, pa));
        a = pa;
        let (pb, pe_b) = parent[&b];
        up_v.push((pe_b, b, pb));
        b = pb;
    }

    // Closed walk: u --chord--> v --up--> LCA --down--> u.
    let mut steps = Vec::with_capacity(1 + up_u.len() + up_v.len());
    steps.push((chord, 1));
    for &(p, from, _to) in &up_v {
        steps.push((p, step_sign(network, p, from)));
    }
    for &(p, _from, to) in up_u.iter().rev() {
        // Descending: traversal runs parent -> child.
        steps.push((p, step_sign(network, p, to)));
    }
    Cycle { steps }
}

/// Sign of traversing `pipe` starting from node `from`.
fn step_sign(network: &Network, pipe: PipeId, from: NodeId) -> i8 {
    let p = network.pipe(pipe).expect("pipe exists");
    if p.start == from { 1 } else { -1 }
}
