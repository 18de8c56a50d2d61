//! Network data model for hydronet.
//!
//! Provides:
//! - `Network`: mutable node/pipe store with identifier-based lookup and
//!   adjacency queries
//! - `Node` / `Pipe`: boundary conditions, equipment, solved fields
//! - `find_cycles`: fundamental cycle detection over the undirected topology

pub mod cycles;
pub mod equipment;
pub mod error;
pub mod graph;

pub use cycles::{Cycle, find_cycles};
pub use equipment::{PumpCurve, Valve};
pub use error::GraphError;
pub use graph::{Network, Node, Pipe};
