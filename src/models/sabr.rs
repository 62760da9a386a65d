// src/models/sabr.rs
//! Lognormal SABR model (β = 1) in log-volatility coordinates
//!
//! ```text
//! dF_t = σ_t F_t dW_t^(1)
//! dσ_t = ν σ_t dW_t^(2),    d⟨W^(1), W^(2)⟩_t = ρ dt
//! ```
//!
//! The state is `[F, ln σ]`. The volatility is stepped exactly
//! ```text
//! ln σ_{n+1} = ln σ_n - ½ν²Δt + ν ΔW^(2)
//! ```
//! and the forward with a log-Euler step using the start-of-step volatility.

use super::model::{correlate, TwoFactorModel};
use crate::error::{validation::*, SdeError, SdeResult};

#[derive(Clone, Copy, Debug)]
pub struct SabrParams {
    pub f0: f64,    // Initial forward
    pub alpha: f64, // Initial volatility σ_0
    pub rho: f64,   // Correlation between forward and volatility
    pub nu: f64,    // Volatility of volatility
}

#[derive(Clone, Debug)]
pub struct Sabr {
    pub params: SabrParams,
}

impl Sabr {
    pub fn new(params: SabrParams) -> SdeResult<Self> {
        validate_positive("f0", params.f0)?;
        validate_positive("alpha", params.alpha)?;
        validate_correlation("rho", params.rho)?;
        validate_finite("nu", params.nu)?;
        validate_positive("nu", params.nu)?;
        Ok(Sabr { params })
    }
}

impl TwoFactorModel for Sabr {
    fn initial_state(&self) -> [f64; 2] {
        [self.params.f0, self.params.alpha.ln()]
    }

    fn step_with_dw(&self, y: &mut [f64; 2], _t: f64, dt: f64, dw1: f64, dw2: f64) -> SdeResult<()> {
        let (dw_f, dw_v) = correlate(self.params.rho, dw1, dw2);
        let nu = self.params.nu;
        let sigma = y[1].exp();

        y[0] *= (-0.5 * sigma * sigma * dt + sigma * dw_f).exp();
        y[1] += -0.5 * nu * nu * dt + nu * dw_v;

        if !y[0].is_finite() || y[0] < 0.0 {
            return Err(SdeError::NumericalInstability {
                method: "SABR step".to_string(),
                reason: format!("forward became invalid after step: {}", y[0]),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SabrParams {
        SabrParams {
            f0: 100.0,
            alpha: 0.3,
            rho: -0.4,
            nu: 0.6,
        }
    }

    #[test]
    fn test_invalid_params() {
        assert!(Sabr::new(SabrParams { f0: -1.0, ..params() }).is_err());
        assert!(Sabr::new(SabrParams { rho: 1.5, ..params() }).is_err());
        assert!(Sabr::new(SabrParams { nu: 0.0, ..params() }).is_err());
    }

    #[test]
    fn test_initial_state_is_log_vol() {
        let model = Sabr::new(params()).unwrap();
        let y = model.initial_state();
        assert_eq!(y[0], 100.0);
        assert!((y[1] - 0.3f64.ln()).abs() < 1e-15);
    }

    #[test]
    fn test_zero_increment_step_is_drift_only() {
        let model = Sabr::new(params()).unwrap();
        let mut y = model.initial_state();
        let dt = 0.01;
        model.step_with_dw(&mut y, 0.0, dt, 0.0, 0.0).unwrap();
        assert!((y[0] - 100.0 * (-0.5 * 0.09 * dt).exp()).abs() < 1e-12);
        assert!((y[1] - (0.3f64.ln() - 0.5 * 0.36 * dt)).abs() < 1e-12);
    }
}
