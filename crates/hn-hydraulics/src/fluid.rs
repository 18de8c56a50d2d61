//! Fluid property sets.

/// Alternate multi-phase parameter set. Selection is the caller's
/// responsibility; the solvers only forward the active set to the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiPhase {
    pub liquid_density: f64,
    pub gas_density: f64,
    pub liquid_viscosity: f64,
    pub gas_viscosity: f64,
    /// N/m, reserved for flow-regime correlations.
    pub surface_tension: f64,
    /// No-slip gas volume fraction of the mixture, 0..1.
    pub gas_volume_fraction: f64,
}

impl Default for MultiPhase {
    fn default() -> Self {
        // Water/air at ambient conditions.
        Self {
            liquid_density: 998.0,
            gas_density: 1.2,
            liquid_viscosity: 1e-3,
            gas_viscosity: 1.8e-5,
            surface_tension: 0.072,
            gas_volume_fraction: 0.0,
        }
    }
}

/// Working fluid: single-phase properties plus an optional multi-phase set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluid {
    /// kg/m^3
    pub density: f64,
    /// Pa*s
    pub viscosity: f64,
    pub multiphase: Option<MultiPhase>,
}

impl Default for Fluid {
    fn default() -> Self {
        Self::water()
    }
}

impl Fluid {
    /// Water at 20 C.
    pub fn water() -> Self {
        Self {
            density: 998.0,
            viscosity: 1e-3,
            multiphase: None,
        }
    }

    /// Homogeneous (no-slip) mixture density, or the single-phase density.
    pub fn effective_density(&self) -> f64 {
        match &self.multiphase {
            Some(mp) => {
                let lambda_l = 1.0 - mp.gas_volume_fraction;
                lambda_l * mp.liquid_density + mp.gas_volume_fraction * mp.gas_density
            }
            None => self.density,
        }
    }

    /// Homogeneous (no-slip) mixture viscosity, or the single-phase viscosity.
    pub fn effective_viscosity(&self) -> f64 {
        match &self.multiphase {
            Some(mp) => {
                let lambda_l = 1.0 - mp.gas_volume_fraction;
                lambda_l * mp.liquid_viscosity + mp.gas_volume_fraction * mp.gas_viscosity
            }
            None => self.viscosity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_defaults() {
        let fluid = Fluid::default();
        assert_eq!(fluid.density, 998.0);
        assert_eq!(fluid.viscosity, 1e-3);
        assert!(fluid.multiphase.is_none());
    }

    #[test]
    fn mixture_density_interpolates() {
        let fluid = Fluid {
            multiphase: Some(MultiPhase {
                gas_volume_fraction: 0.5,
                ..MultiPhase::default()
            }),
            ..Fluid::water()
        };
        let rho = fluid.effective_density();
        assert!((rho - (0.5 * 998.0 + 0.5 * 1.2)).abs() < 1e-9);
        // A gassy mixture is lighter than the pure liquid.
        assert!(rho < 998.0);
    }

    #[test]
    fn zero_gas_fraction_matches_liquid() {
        let fluid = Fluid {
            multiphase: Some(MultiPhase::default()),
            ..Fluid::water()
        };
        assert!((fluid.effective_density() - 998.0).abs() < 1e-9);
        assert!((fluid.effective_viscosity() - 1e-3).abs() < 1e-12);
    }
}
