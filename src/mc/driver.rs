// src/mc/driver.rs
//! Adaptive time-stepping driver for two-factor models
//!
//! # Loop
//!
//! ```text
//! (t_next, state) = controller.init(t0, y0)
//! while t < T:
//!     t_end = min(t_next, T)
//!     y_cand = model.step(y, t, t_end - t, ΔW)
//!     decision = controller.adapt_step_size(t, t_end, y, y_cand, state)
//!     if decision.accept: (t, y) = (t_end, y_cand)
//!     t_next = decision.t1
//! ```
//!
//! A rejected step is retried with fresh Brownian increments. Resampling after
//! rejection biases the path law slightly; the previsible controller mode
//! never rejects and avoids this.

use crate::controller::{StepRequest, StepSizeController};
use crate::error::{validation::*, SdeError, SdeResult};
use crate::models::model::TwoFactorModel;
use crate::rng::{self, RngFactory};
use rand::Rng;
use rayon::prelude::*;

#[derive(Clone, Debug)]
pub struct AdaptiveConfig {
    pub t0: f64,
    pub t1: f64,
    pub max_steps: usize,
    pub paths: usize,
    pub seed: u64,
}

impl AdaptiveConfig {
    /// Validate the driver configuration
    pub fn validate(&self) -> SdeResult<()> {
        validate_finite("t0", self.t0)?;
        validate_finite("t1", self.t1)?;
        if self.t1 <= self.t0 {
            return Err(SdeError::InvalidConfiguration {
                field: "t1".to_string(),
                reason: format!("must be greater than t0 ({})", self.t0),
            });
        }
        if self.max_steps == 0 {
            return Err(SdeError::InvalidConfiguration {
                field: "max_steps".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.paths == 0 {
            return Err(SdeError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        AdaptiveConfig {
            t0: 0.0,
            t1: 1.0,
            max_steps: 100_000,
            paths: 1_000,
            seed: 12345,
        }
    }
}

/// Accepted grid and states of one simulated path.
#[derive(Clone, Debug, Default)]
pub struct AdaptivePath {
    pub times: Vec<f64>,
    pub states: Vec<[f64; 2]>,
    pub accepted: usize,
    pub rejected: usize,
}

impl AdaptivePath {
    pub fn terminal_state(&self) -> Option<[f64; 2]> {
        self.states.last().copied()
    }

    pub fn step_sizes(&self) -> Vec<f64> {
        self.times.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// Aggregate statistics over many paths.
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveSummary {
    pub paths: usize,
    pub mean_terminal_value: f64,
    pub mean_accepted_steps: f64,
    pub rejection_rate: f64,
}

/// Integrate one path of `model` from `cfg.t0` to `cfg.t1`.
///
/// # Errors
///
/// - [`SdeError::MaxStepsReached`] when `cfg.max_steps` attempts (accepted or
///   rejected) do not reach `cfg.t1`
/// - Controller or model errors are propagated unchanged
pub fn simulate_adaptive_path<M, C, R>(
    model: &M,
    controller: &C,
    cfg: &AdaptiveConfig,
    rng: &mut R,
) -> SdeResult<AdaptivePath>
where
    M: TwoFactorModel + ?Sized,
    C: StepSizeController<f64>,
    R: Rng + ?Sized,
{
    cfg.validate()?;

    let mut y = model.initial_state();
    let mut t = cfg.t0;
    let (mut t_next, mut state) = controller.init(t, cfg.t1, &y, None, None)?;

    let mut path = AdaptivePath::default();
    path.times.push(t);
    path.states.push(y);

    let mut attempts = 0;
    while t < cfg.t1 {
        if attempts >= cfg.max_steps {
            return Err(SdeError::MaxStepsReached {
                max_steps: cfg.max_steps,
                t,
            });
        }
        attempts += 1;

        let t_end = t_next.min(cfg.t1);
        let dt = t_end - t;
        if !(dt > 0.0) {
            return Err(SdeError::NumericalInstability {
                method: "adaptive driver".to_string(),
                reason: format!("non-positive step {} proposed at t = {}", dt, t),
            });
        }

        let (dw1, dw2) = rng::brownian_increments(rng, dt);
        let mut candidate = y;
        model.step_with_dw(&mut candidate, t, dt, dw1, dw2)?;

        let decision = controller.adapt_step_size(StepRequest {
            t0: t,
            t1: t_end,
            y0: &y,
            y1_candidate: &candidate,
            y_error: None,
            error_order: None,
            controller_state: state,
        })?;
        if !decision.result.is_successful() {
            return Err(SdeError::NumericalInstability {
                method: "adaptive driver".to_string(),
                reason: format!("controller reported {:?} at t = {}", decision.result, t),
            });
        }

        if decision.accept {
            t = t_end;
            y = candidate;
            path.times.push(t);
            path.states.push(y);
            path.accepted += 1;
        } else {
            tracing::trace!(t, dt, retry_until = decision.t1, "step rejected");
            path.rejected += 1;
        }

        t_next = decision.t1;
        state = decision.state;
    }

    Ok(path)
}

/// Integrate `cfg.paths` independent paths in parallel.
pub fn simulate_adaptive_paths<M, C>(
    model: &M,
    controller: &C,
    cfg: &AdaptiveConfig,
) -> SdeResult<Vec<AdaptivePath>>
where
    M: TwoFactorModel,
    C: StepSizeController<f64> + Sync,
{
    cfg.validate()?;
    let factory = RngFactory::new(cfg.seed);

    let paths = (0..cfg.paths)
        .into_par_iter()
        .map(|i| {
            let mut rng = factory.create_std_rng(i as u64);
            simulate_adaptive_path(model, controller, cfg, &mut rng)
        })
        .collect::<SdeResult<Vec<_>>>()?;

    tracing::debug!(
        paths = paths.len(),
        accepted = paths.iter().map(|p| p.accepted).sum::<usize>(),
        rejected = paths.iter().map(|p| p.rejected).sum::<usize>(),
        "adaptive simulation finished"
    );

    Ok(paths)
}

pub fn summarize(paths: &[AdaptivePath]) -> AdaptiveSummary {
    let n = paths.len().max(1) as f64;
    let accepted: usize = paths.iter().map(|p| p.accepted).sum();
    let rejected: usize = paths.iter().map(|p| p.rejected).sum();
    let terminal: f64 = paths
        .iter()
        .filter_map(|p| p.terminal_state())
        .map(|y| y[0])
        .sum();
    let attempts = (accepted + rejected).max(1) as f64;

    AdaptiveSummary {
        paths: paths.len(),
        mean_terminal_value: terminal / n,
        mean_accepted_steps: accepted as f64 / n,
        rejection_rate: rejected as f64 / attempts,
    }
}
