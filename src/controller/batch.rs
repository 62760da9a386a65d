// src/controller/batch.rs
//! Lane-wise evaluation of stateless controllers.
//!
//! Many independent trajectories are advanced in lockstep: lane `i` owns
//! `t0[i]`, `t1[i]` and the rows `y0[i, ..]`, `y1[i, ..]` of `n x 2` state
//! arrays. Every lane runs the exact scalar code path, so a lane's decision is
//! bit-identical to calling the controller on that lane alone.

use super::{StepRequest, StepSizeController};
use crate::error::{validation::validate_state_len, SdeError, SdeResult};
use crate::scalar::Real;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Per-lane answers of [`adapt_lanes`].
#[derive(Clone, Debug, PartialEq)]
pub struct LaneDecisions<T> {
    pub accept: Array1<bool>,
    pub t0: Array1<T>,
    pub t1: Array1<T>,
}

impl<T> LaneDecisions<T> {
    pub fn len(&self) -> usize {
        self.accept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accept.is_empty()
    }

    pub fn accepted_count(&self) -> usize {
        self.accept.iter().filter(|&&a| a).count()
    }
}

fn check_lanes(field: &str, expected: usize, found: usize) -> SdeResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SdeError::InvalidConfiguration {
            field: field.to_string(),
            reason: format!("expected {} lanes, got {}", expected, found),
        })
    }
}

fn row<T: Real>(y: &ArrayView2<'_, T>, lane: usize) -> [T; 2] {
    [y[[lane, 0]], y[[lane, 1]]]
}

/// Desired step size for every entry of `v`.
pub fn desired_step_sizes<T: Real>(
    controller: &super::SabrController<T>,
    v: ArrayView1<'_, T>,
) -> Array1<T> {
    v.mapv(|v| controller.desired_step_size(v))
}

/// First stop time for every lane.
pub fn init_lanes<T, C>(controller: &C, t0: ArrayView1<'_, T>, y0: ArrayView2<'_, T>) -> SdeResult<Array1<T>>
where
    T: Real,
    C: StepSizeController<T, State = ()> + Sync,
{
    validate_state_len(2, y0.ncols())?;
    check_lanes("y0", t0.len(), y0.nrows())?;

    let t1: Vec<T> = (0..t0.len())
        .into_par_iter()
        .map(|lane| {
            let y = row(&y0, lane);
            controller
                .init(t0[lane], t0[lane], &y, None, None)
                .map(|(t1, ())| t1)
        })
        .collect::<SdeResult<Vec<T>>>()?;

    Ok(Array1::from(t1))
}

/// Accept/reject every lane and propose its next step.
pub fn adapt_lanes<T, C>(
    controller: &C,
    t0: ArrayView1<'_, T>,
    t1: ArrayView1<'_, T>,
    y0: ArrayView2<'_, T>,
    y1_candidate: ArrayView2<'_, T>,
) -> SdeResult<LaneDecisions<T>>
where
    T: Real,
    C: StepSizeController<T, State = ()> + Sync,
{
    let lanes = t0.len();
    validate_state_len(2, y0.ncols())?;
    validate_state_len(2, y1_candidate.ncols())?;
    check_lanes("t1", lanes, t1.len())?;
    check_lanes("y0", lanes, y0.nrows())?;
    check_lanes("y1_candidate", lanes, y1_candidate.nrows())?;

    let decisions = (0..lanes)
        .into_par_iter()
        .map(|lane| {
            let a = row(&y0, lane);
            let b = row(&y1_candidate, lane);
            controller.adapt_step_size(StepRequest::stateless(t0[lane], t1[lane], &a, &b))
        })
        .collect::<SdeResult<Vec<_>>>()?;

    Ok(LaneDecisions {
        accept: decisions.iter().map(|d| d.accept).collect(),
        t0: decisions.iter().map(|d| d.t0).collect(),
        t1: decisions.iter().map(|d| d.t1).collect(),
    })
}
