//! Hydraulic pressure model for hydronet networks.
//!
//! Provides:
//! - `Fluid`: single-phase properties with an optional multi-phase set
//! - `FrictionCorrelation`: selectable Darcy friction factor correlations
//! - `PressureModel`: the pure pressure-drop/head-gain interface the
//!   solvers consume
//! - `DarcyWeisbach`: default model implementation

pub mod error;
pub mod fluid;
pub mod friction;
pub mod model;

pub use error::{HydError, HydResult};
pub use fluid::{Fluid, MultiPhase};
pub use friction::FrictionCorrelation;
pub use model::{DarcyWeisbach, PressureModel};
