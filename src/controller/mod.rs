// src/controller/mod.rs
//! Step-size controllers
//!
//! A controller is consulted by the integration driver once at the start
//! ([`StepSizeController::init`]) and then once per attempted step
//! ([`StepSizeController::adapt_step_size`]). Each call decides whether the
//! attempted step is kept and where the next step should stop.
//!
//! ```text
//! driver                         controller
//!   | -- init(t0, t1, y0) ------------> |
//!   | <----------- (t_next, state) ---- |
//!   |   integrate y0 -> y1 over [t0, t_next]
//!   | -- adapt_step_size(request) ----> |
//!   | <-- accept, t0', t1', state' ---- |
//!   |   ... repeat until t1 reached
//! ```

pub mod batch;
pub mod checkpoints;
pub mod sabr;

use crate::error::SdeResult;
use crate::scalar::Real;

pub use checkpoints::{clip_to_checkpoints, Checkpoints};
pub use sabr::{SabrController, SabrControllerConfig};

/// Outcome code reported alongside a step decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepResult {
    Successful,
    MaxStepsReached,
    DtMinReached,
    Diverged,
}

impl StepResult {
    pub fn is_successful(self) -> bool {
        matches!(self, StepResult::Successful)
    }
}

/// Direction of integration in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Forward for a non-negative sign, backward otherwise.
    pub fn from_sign<T: Real>(sign: T) -> Self {
        if sign < T::zero() {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

/// Everything the driver hands to [`StepSizeController::adapt_step_size`].
///
/// `y_error`, `error_order` and `controller_state` are carried for every
/// controller even when a particular controller ignores them.
#[derive(Clone, Debug)]
pub struct StepRequest<'a, T, S> {
    pub t0: T,
    pub t1: T,
    pub y0: &'a [T],
    pub y1_candidate: &'a [T],
    pub y_error: Option<&'a [T]>,
    pub error_order: Option<T>,
    pub controller_state: S,
}

impl<'a, T: Real> StepRequest<'a, T, ()> {
    /// Request for a stateless controller with no error estimate.
    pub fn stateless(t0: T, t1: T, y0: &'a [T], y1_candidate: &'a [T]) -> Self {
        StepRequest {
            t0,
            t1,
            y0,
            y1_candidate,
            y_error: None,
            error_order: None,
            controller_state: (),
        }
    }
}

/// Answer to a [`StepRequest`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepDecision<T, S> {
    /// Whether the attempted step is kept.
    pub accept: bool,
    /// Start of the next step (`t1` if accepted, `t0` to retry).
    pub t0: T,
    /// Proposed end of the next step.
    pub t1: T,
    /// Ask the driver to reuse the previous step size verbatim.
    pub keep_step_size: bool,
    pub state: S,
    pub result: StepResult,
}

/// Shared capability of every step-size controller.
pub trait StepSizeController<T: Real>: Sized {
    /// State threaded through successive calls; `()` for stateless controllers.
    type State: Clone + std::fmt::Debug;

    /// Choose where the first step stops.
    fn init(
        &self,
        t0: T,
        t1: T,
        y0: &[T],
        dt0: Option<T>,
        error_order: Option<T>,
    ) -> SdeResult<(T, Self::State)>;

    /// Accept or reject the attempted step and propose the next one.
    fn adapt_step_size(
        &self,
        request: StepRequest<'_, T, Self::State>,
    ) -> SdeResult<StepDecision<T, Self::State>>;

    /// Adapt the controller to the integration direction.
    fn wrap(&self, direction: Direction) -> Self;
}
