//! Error types for hydraulic calculations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HydError {
    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error(transparent)]
    Core(#[from] hn_core::HnError),
}

pub type HydResult<T> = Result<T, HydError>;
