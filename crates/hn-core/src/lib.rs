//! hn-core: stable foundation for hydronet.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + float guards)
//! - ids (stable compact IDs for network objects)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HnError, HnResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
