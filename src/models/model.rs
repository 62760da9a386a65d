// src/models/model.rs
use crate::error::SdeResult;

/// Two-factor stochastic volatility model with state `[value, log_vol]`.
///
/// The second component is the log-volatility `ln σ` that the variance-driven
/// step-size controller reads.
pub trait TwoFactorModel: Sync {
    fn initial_state(&self) -> [f64; 2];

    /// Advance `y` over `[t, t + dt]` given independent Brownian increments
    /// `dw1, dw2 ~ N(0, dt)`. Correlation is applied by the model.
    fn step_with_dw(&self, y: &mut [f64; 2], t: f64, dt: f64, dw1: f64, dw2: f64) -> SdeResult<()>;
}

/// Correlate two independent increments: returns `(dw1, ρ dw1 + √(1-ρ²) dw2)`.
pub fn correlate(rho: f64, dw1: f64, dw2: f64) -> (f64, f64) {
    (dw1, rho * dw1 + (1.0 - rho * rho).sqrt() * dw2)
}
