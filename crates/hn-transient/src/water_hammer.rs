//! Water-hammer surge estimation.
//!
//! Sudden velocity changes launch a pressure wave; its magnitude follows
//! the Joukowsky relation `dP = rho * a * dV` with the wave speed `a` from
//! the Korteweg formula, which softens the acoustic speed by the elastic
//! give of the pipe wall.

/// Pressure-wave parameters, defaulting to water in a steel pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterHammerParams {
    /// Fixed wave speed override in m/s; computed per pipe when `None`.
    pub wave_speed: Option<f64>,
    /// Fluid bulk modulus, Pa.
    pub bulk_modulus: f64,
    /// Pipe wall thickness, m.
    pub wall_thickness: f64,
    /// Pipe material elastic modulus, Pa.
    pub elastic_modulus: f64,
}

impl Default for WaterHammerParams {
    fn default() -> Self {
        Self {
            wave_speed: None,
            bulk_modulus: 2.2e9,
            wall_thickness: 5e-3,
            elastic_modulus: 200e9,
        }
    }
}

impl WaterHammerParams {
    /// Wave speed in m/s for a pipe of inner diameter `diameter` carrying a
    /// fluid of density `rho`. Falls back to the rigid-pipe speed
    /// `sqrt(K / rho)` when the wall terms are unusable.
    pub fn speed(&self, rho: f64, diameter: f64) -> f64 {
        if let Some(a) = self.wave_speed {
            return a;
        }
        let rigid = (self.bulk_modulus / rho).sqrt();
        if self.wall_thickness <= 0.0 || self.elastic_modulus <= 0.0 {
            return rigid;
        }
        let compliance =
            1.0 + self.bulk_modulus * diameter / (self.elastic_modulus * self.wall_thickness);
        (self.bulk_modulus / (rho * compliance)).sqrt()
    }
}

/// Joukowsky surge magnitude in Pa for a velocity change `dv`.
pub fn joukowsky_surge(rho: f64, wave_speed: f64, dv: f64) -> f64 {
    rho * wave_speed * dv.abs()
}
