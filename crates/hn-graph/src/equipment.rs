//! Inline pipe equipment: pump curves and valves.

/// Quadratic pump curve: gain = a + b*Q + c*Q^2 (Pa, Q in m^3/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PumpCurve {
    /// Pressure gain for a given volumetric flow rate.
    pub fn pressure_gain(&self, flow_rate: f64) -> f64 {
        self.a + self.b * flow_rate + self.c * flow_rate * flow_rate
    }
}

/// Valve with a dimensionless loss coefficient K.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valve {
    pub k: f64,
}

impl Valve {
    /// Pressure loss dp = K * rho * v^2 / 2.
    pub fn pressure_drop(&self, rho: f64, velocity: f64) -> f64 {
        self.k * rho * velocity * velocity / 2.0
    }
}
