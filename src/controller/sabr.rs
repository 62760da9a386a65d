// src/controller/sabr.rs
//! Variance-driven step-size controller for stochastic volatility models
//!
//! # Control Law
//!
//! Classical error-estimate control is unreliable for mean-reverting variance
//! processes (CIR, SABR) near zero. Instead the step size is read directly off
//! the log-volatility component `v = y[1]` of the two-component state:
//! ```text
//! z  = 1 + ctol * exp(-2v)
//! dt = ln z                      (continuous-time moment)
//! dt = x  s.t. (e^x - 1)/x = z   (Euler moment, `euler = true`)
//! ```
//! followed by NaN/infinity substitution and clamping to `[dtmin, dtmax]`.
//! High volatility gives small steps, low volatility large ones.
//!
//! # Modes
//!
//! - **Reactive** (default): the step `[t0, t1]` is accepted iff
//!   `t1 - t0 < 1.1 * dt(max(v0, v1))`. Rejected steps are retried from `t0`.
//! - **Previsible**: every step is accepted and the next step size is derived
//!   from the candidate end state alone.

use super::checkpoints::{clip_to_checkpoints, Checkpoints};
use super::{Direction, StepDecision, StepRequest, StepResult, StepSizeController};
use crate::error::{validation::*, SdeError, SdeResult};
use crate::math_utils::inv_expm1_over_x;
use crate::scalar::{clamp, nan_to_num, Real};

const STEP_TS_FIELD: &str = "`SabrController.step_ts`";

/// Slack on the acceptance test so steps right at the boundary are not
/// rejected over and over.
const ACCEPT_SLACK: f64 = 1.1;

/// Maximum that keeps NaN, so a NaN volatility is sized as `dtmin` and rejected.
fn nan_max<T: Real>(a: T, b: T) -> T {
    if a.is_nan() || b.is_nan() {
        T::nan()
    } else {
        a.max(b)
    }
}

/// Configuration of a [`SabrController`]
#[derive(Clone, Debug, PartialEq)]
pub struct SabrControllerConfig<T> {
    /// Control tolerance (> 0)
    pub ctol: T,
    /// Smallest step size ever proposed
    pub dtmin: T,
    /// Largest step size ever proposed
    pub dtmax: T,
    /// Mandatory stop times
    pub step_ts: Option<Checkpoints>,
    /// Never reject; size the next step from the candidate end state
    pub previsible: bool,
    /// Use the Euler-scheme moment relation instead of the continuous one
    pub euler: bool,
}

impl<T: Real> SabrControllerConfig<T> {
    /// Validate the controller configuration
    pub fn validate(&self) -> SdeResult<()> {
        let ctol = self.ctol.to_double();
        let dtmin = self.dtmin.to_double();
        let dtmax = self.dtmax.to_double();

        validate_finite("ctol", ctol)?;
        validate_positive("ctol", ctol)?;
        validate_finite("dtmin", dtmin)?;
        validate_positive("dtmin", dtmin)?;
        validate_finite("dtmax", dtmax)?;

        if dtmax < dtmin {
            return Err(SdeError::InvalidParameters {
                parameter: "dtmax".to_string(),
                value: dtmax,
                constraint: format!("must be >= dtmin ({})", dtmin),
            });
        }

        if let Some(step_ts) = &self.step_ts {
            step_ts.check_precision::<T>(STEP_TS_FIELD)?;
        }

        Ok(())
    }
}

impl<T: Real> Default for SabrControllerConfig<T> {
    fn default() -> Self {
        SabrControllerConfig {
            ctol: T::from_double(1e-2),
            dtmin: T::from_double(1e-6),
            dtmax: T::from_double(0.1),
            step_ts: None,
            previsible: false,
            euler: false,
        }
    }
}

/// Step-size controller driven by the volatility component of the state.
///
/// Carries no state between calls; every decision is a pure function of the
/// configuration and the bracketing states.
#[derive(Clone, Debug, PartialEq)]
pub struct SabrController<T> {
    config: SabrControllerConfig<T>,
}

impl<T: Real> SabrController<T> {
    pub fn new(config: SabrControllerConfig<T>) -> SdeResult<Self> {
        config.validate()?;

        if config.dtmin == config.dtmax {
            tracing::warn!(
                dt = config.dtmin.to_double(),
                "dtmin == dtmax: controller degenerates to a fixed step"
            );
        }

        Ok(SabrController { config })
    }

    /// Reactive, continuous-moment controller without checkpoints.
    pub fn with_bounds(ctol: T, dtmin: T, dtmax: T) -> SdeResult<Self> {
        Self::new(SabrControllerConfig {
            ctol,
            dtmin,
            dtmax,
            ..Default::default()
        })
    }

    pub fn with_step_ts(mut self, step_ts: Checkpoints) -> SdeResult<Self> {
        step_ts.check_precision::<T>(STEP_TS_FIELD)?;
        self.config.step_ts = Some(step_ts);
        Ok(self)
    }

    pub fn previsible(mut self, previsible: bool) -> Self {
        self.config.previsible = previsible;
        self
    }

    pub fn euler(mut self, euler: bool) -> Self {
        self.config.euler = euler;
        self
    }

    pub fn config(&self) -> &SabrControllerConfig<T> {
        &self.config
    }

    /// Step size appropriate for log-volatility `v`, always in `[dtmin, dtmax]`.
    pub fn desired_step_size(&self, v: T) -> T {
        let cfg = &self.config;
        let z = T::one() + cfg.ctol * (T::from_double(-2.0) * v).exp();
        let step_size = if cfg.euler {
            inv_expm1_over_x(z)
        } else {
            z.ln()
        };
        let step_size = nan_to_num(step_size, cfg.dtmin, cfg.dtmax);
        clamp(step_size, cfg.dtmin, cfg.dtmax)
    }

    fn clip_step_ts(&self, t0: T, t1: T) -> SdeResult<T> {
        clip_to_checkpoints(t0, t1, self.config.step_ts.as_ref(), STEP_TS_FIELD)
    }
}

impl<T: Real> StepSizeController<T> for SabrController<T> {
    type State = ();

    fn init(
        &self,
        t0: T,
        _t1: T,
        y0: &[T],
        _dt0: Option<T>,
        _error_order: Option<T>,
    ) -> SdeResult<(T, ())> {
        validate_state_len(2, y0.len())?;
        let step_size = self.desired_step_size(y0[1]);
        let t1 = self.clip_step_ts(t0, t0 + step_size)?;
        Ok((t1, ()))
    }

    fn adapt_step_size(&self, request: StepRequest<'_, T, ()>) -> SdeResult<StepDecision<T, ()>> {
        let StepRequest {
            t0,
            t1,
            y0,
            y1_candidate,
            ..
        } = request;
        validate_state_len(2, y0.len())?;
        validate_state_len(2, y1_candidate.len())?;

        let v1 = y1_candidate[1];
        let accepted_desired = self.desired_step_size(v1);

        if self.config.previsible {
            let new_t1 = self.clip_step_ts(t1, t1 + accepted_desired)?;
            return Ok(StepDecision {
                accept: true,
                t0: t1,
                t1: new_t1,
                keep_step_size: false,
                state: (),
                result: StepResult::Successful,
            });
        }

        let v0 = y0[1];
        let desired = self.desired_step_size(nan_max(v0, v1));
        let accept = t1 - t0 < T::from_double(ACCEPT_SLACK) * desired;
        let (new_t0, new_dt) = if accept {
            (t1, accepted_desired)
        } else {
            (t0, desired)
        };
        let new_dt = clamp(new_dt, self.config.dtmin, self.config.dtmax);
        let new_t1 = self.clip_step_ts(new_t0, new_t0 + new_dt)?;

        Ok(StepDecision {
            accept,
            t0: new_t0,
            t1: new_t1,
            keep_step_size: false,
            state: (),
            result: StepResult::Successful,
        })
    }

    fn wrap(&self, _direction: Direction) -> Self {
        self.clone()
    }
}
