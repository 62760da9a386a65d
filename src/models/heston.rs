// src/models/heston.rs
//! Heston Stochastic Volatility Model in log-volatility coordinates
//!
//! # Mathematical Framework
//!
//! ```text
//! dS_t = r S_t dt + √V_t S_t dW_t^(1)
//! dV_t = κ(θ - V_t) dt + ξ√V_t dW_t^(2)
//! ```
//!
//! The variance follows a CIR process. The state handed to the step-size
//! controller is `[S, ½ ln V]`, i.e. the log of the instantaneous volatility.
//! A variance truncated at zero maps to `-∞`, which the controller turns into
//! its largest step.
//!
//! # Feller Condition
//!
//! ```text
//! 2κθ > ξ²
//! ```
//!
//! When violated the variance reaches zero in finite time. This is logged, not
//! rejected, since the full truncation scheme handles it.

use super::model::{correlate, TwoFactorModel};
use crate::error::{validation::*, SdeError, SdeResult};

#[derive(Clone, Copy, Debug)]
pub struct HestonParams {
    pub s0: f64,    // Initial stock price
    pub v0: f64,    // Initial variance
    pub r: f64,     // Risk-free rate
    pub kappa: f64, // Mean reversion speed
    pub theta: f64, // Long-term variance
    pub xi: f64,    // Volatility of variance (vol-of-vol)
    pub rho: f64,   // Correlation between stock and variance
}

#[derive(Clone, Debug)]
pub struct Heston {
    pub params: HestonParams,
}

impl Heston {
    pub fn new(params: HestonParams) -> SdeResult<Self> {
        Self::validate_params(&params)?;

        let feller = 2.0 * params.kappa * params.theta;
        if feller <= params.xi * params.xi {
            tracing::warn!(
                feller,
                xi_squared = params.xi * params.xi,
                "Feller condition violated (2κθ ≤ ξ²); variance may hit zero"
            );
        }

        Ok(Heston { params })
    }

    /// Validate Heston parameters
    fn validate_params(params: &HestonParams) -> SdeResult<()> {
        validate_positive("s0", params.s0)?;
        validate_positive("v0", params.v0)?;
        validate_finite("r", params.r)?;
        validate_positive("kappa", params.kappa)?;
        validate_positive("theta", params.theta)?;
        validate_positive("xi", params.xi)?;
        validate_correlation("rho", params.rho)?;

        if params.kappa > 100.0 {
            return Err(SdeError::InvalidParameters {
                parameter: "kappa".to_string(),
                value: params.kappa,
                constraint: "extremely high mean reversion speed (>100) may cause numerical issues"
                    .to_string(),
            });
        }

        if params.xi > 5.0 {
            return Err(SdeError::InvalidParameters {
                parameter: "xi".to_string(),
                value: params.xi,
                constraint: "extremely high vol-of-vol (>5) may cause numerical issues".to_string(),
            });
        }

        Ok(())
    }

    /// Does the parameter set satisfy 2κθ > ξ²?
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.params.kappa * self.params.theta > self.params.xi * self.params.xi
    }
}

impl TwoFactorModel for Heston {
    fn initial_state(&self) -> [f64; 2] {
        [self.params.s0, 0.5 * self.params.v0.ln()]
    }

    /// Full truncation Euler on `(S, V)`:
    /// ```text
    /// V⁺ = max(V_n, 0)
    /// V_{n+1} = max(0, V_n + κ(θ - V⁺)Δt + ξ√V⁺ ΔW_v)
    /// S_{n+1} = S_n exp((r - ½V⁺)Δt + √V⁺ ΔW_s)
    /// ```
    fn step_with_dw(&self, y: &mut [f64; 2], _t: f64, dt: f64, dw1: f64, dw2: f64) -> SdeResult<()> {
        let p = &self.params;
        let (dw_s, dw_v) = correlate(p.rho, dw1, dw2);

        let v = (2.0 * y[1]).exp();
        let v_plus = v.max(0.0);
        let sqrt_v = v_plus.sqrt();

        let v_next = (v + p.kappa * (p.theta - v_plus) * dt + p.xi * sqrt_v * dw_v).max(0.0);
        y[0] *= ((p.r - 0.5 * v_plus) * dt + sqrt_v * dw_s).exp();
        y[1] = 0.5 * v_next.ln();

        if !y[0].is_finite() || y[0] <= 0.0 {
            return Err(SdeError::NumericalInstability {
                method: "Heston full truncation Euler".to_string(),
                reason: format!("stock price became invalid after step: {}", y[0]),
            });
        }
        Ok(())
    }
}
