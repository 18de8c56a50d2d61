//! Quasi-steady transient simulation for hydronet networks.
//!
//! Models slow transients (valve maneuvers, pump ramps, demand and boundary
//! changes) as a sequence of steady-state solves, with water-hammer surge
//! and cavitation estimated per step:
//! - `TransientEvent`: scheduled, linearly ramped changes
//! - `TransientSolver`: the stepping loop
//! - `TransientResult`: per-step snapshots plus history queries
//! - `water_hammer`: Joukowsky surge with Korteweg wave speed

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod solver;
pub mod water_hammer;

pub use config::TransientConfig;
pub use error::{SimResult, TransientError};
pub use events::{EventKind, EventTarget, TransientEvent};
pub use result::{
    TransientResult, cavitation_events, flow_history, max_surge, pressure_history,
    velocity_history,
};
pub use solver::TransientSolver;
pub use water_hammer::{WaterHammerParams, joukowsky_surge};
