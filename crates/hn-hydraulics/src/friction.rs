//! Darcy friction factor correlations.
//!
//! All correlations take the Reynolds number and relative roughness e/D and
//! return the Darcy-Weisbach friction factor. Laminar flow (Re < 2300) is
//! handled uniformly with 64/Re.

/// Selectable turbulent friction correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrictionCorrelation {
    /// Implicit Colebrook-White, solved by fixed-point iteration. Reference
    /// correlation, valid for Re > 4000 and all e/D.
    #[default]
    ColebrookWhite,
    /// Explicit Swamee-Jain approximation of Colebrook-White.
    SwameeJain,
    /// Explicit Haaland approximation.
    Haaland,
    /// Churchill's full-range equation (smooth laminar/turbulent blend).
    Churchill,
}

impl FrictionCorrelation {
    /// Friction factor for the given Reynolds number and relative roughness.
    pub fn friction_factor(self, reynolds: f64, rel_roughness: f64) -> f64 {
        if reynolds < 1e-12 {
            return 0.0;
        }
        if reynolds < 2300.0 {
            return 64.0 / reynolds;
        }
        match self {
            Self::ColebrookWhite => colebrook_white(reynolds, rel_roughness),
            Self::SwameeJain => swamee_jain(reynolds, rel_roughness),
            Self::Haaland => haaland(reynolds, rel_roughness),
            Self::Churchill => churchill(reynolds, rel_roughness),
        }
    }
}

fn swamee_jain(re: f64, eps_d: f64) -> f64 {
    let log_term = (eps_d / 3.7 + 5.74 / re.powf(0.9)).log10();
    0.25 / (log_term * log_term)
}

fn colebrook_white(re: f64, eps_d: f64) -> f64 {
    // Fixed-point iteration on 1/sqrt(f), seeded with Swamee-Jain.
    let mut f = swamee_jain(re, eps_d).max(1e-6);
    for _ in 0..50 {
        let inv_sqrt = -2.0 * (eps_d / 3.7 + 2.51 / (re * f.sqrt())).log10();
        let f_new = 1.0 / (inv_sqrt * inv_sqrt);
        if (f_new - f).abs() < 1e-10 {
            return f_new;
        }
        f = f_new;
    }
    f
}

fn haaland(re: f64, eps_d: f64) -> f64 {
    let inv_sqrt = -1.8 * ((eps_d / 3.7).powf(1.11) + 6.9 / re).log10();
    1.0 / (inv_sqrt * inv_sqrt)
}

fn churchill(re: f64, eps_d: f64) -> f64 {
    let a = (2.457 * (1.0 / ((7.0 / re).powf(0.9) + 0.27 * eps_d)).ln()).powi(16);
    let b = (37_530.0 / re).powi(16);
    8.0 * ((8.0 / re).powi(12) + 1.0 / (a + b).powf(1.5)).powf(1.0 / 12.0)
}
