// src/controller/checkpoints.rs
//! Mandatory checkpoint times and the clipping rule shared by all controllers.
//!
//! # Clipping
//!
//! Given the current step start `t0` and a proposed end `t1`, the step is
//! truncated so that `[t0, t1]` never straddles a checkpoint:
//! ```text
//! i0 = #{ c in ts : c <= t0 }      (right-biased search)
//! i1 = #{ c in ts : c <= t1 }
//! t1' = ts[min(i0, n - 1)]  if i0 < i1
//!       t1                  otherwise
//! ```
//! A checkpoint equal to `t0` counts as already passed, so a step starting
//! exactly on a checkpoint is never clipped back onto it.

use crate::error::{SdeError, SdeResult};
use crate::scalar::{Precision, Real};

/// Ordered, strictly increasing sequence of times the integrator must land on.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoints {
    ts: Vec<f64>,
    precision: Precision,
}

impl Checkpoints {
    /// Build a checkpoint sequence, remembering the precision of `S`.
    ///
    /// # Errors
    ///
    /// Returns [`SdeError::InvalidCheckpoints`] when the sequence is empty,
    /// contains a non-finite time, or is not strictly increasing.
    pub fn new<S: Real>(ts: Vec<S>) -> SdeResult<Self> {
        if ts.is_empty() {
            return Err(SdeError::InvalidCheckpoints {
                index: 0,
                reason: "sequence must not be empty".to_string(),
            });
        }

        let ts: Vec<f64> = ts.into_iter().map(Real::to_double).collect();
        for (index, &t) in ts.iter().enumerate() {
            if !t.is_finite() {
                return Err(SdeError::InvalidCheckpoints {
                    index,
                    reason: format!("time {} is not finite", t),
                });
            }
            if index > 0 && t <= ts[index - 1] {
                return Err(SdeError::InvalidCheckpoints {
                    index,
                    reason: format!(
                        "times must be strictly increasing ({} follows {})",
                        t,
                        ts[index - 1]
                    ),
                });
            }
        }

        Ok(Checkpoints {
            ts,
            precision: S::PRECISION,
        })
    }

    pub fn len(&self) -> usize {
        self.ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.ts
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Fail when these checkpoints are wider than the time type `T`: landing on
    /// them would round the checkpoint times. Narrower checkpoints are widened
    /// losslessly. `field` names the configuration entry in the error.
    pub fn check_precision<T: Real>(&self, field: &str) -> SdeResult<()> {
        if self.precision <= T::PRECISION {
            Ok(())
        } else {
            Err(SdeError::PrecisionMismatch {
                field: field.to_string(),
                expected: T::PRECISION.to_string(),
                found: self.precision.to_string(),
            })
        }
    }

    /// Number of checkpoints `<= t`.
    fn search_right(&self, t: f64) -> usize {
        self.ts.partition_point(|&c| c <= t)
    }

    /// Truncate the proposed step `[t0, t1]` at the first checkpoint after `t0`.
    pub fn clip<T: Real>(&self, t0: T, t1: T, field: &str) -> SdeResult<T> {
        self.check_precision::<T>(field)?;

        let i0 = self.search_right(t0.to_double());
        let i1 = self.search_right(t1.to_double());
        if i0 < i1 {
            Ok(T::from_double(self.ts[i0.min(self.ts.len() - 1)]))
        } else {
            Ok(t1)
        }
    }
}

/// Clip `t1` against an optional checkpoint sequence; `None` leaves it as is.
pub fn clip_to_checkpoints<T: Real>(
    t0: T,
    t1: T,
    step_ts: Option<&Checkpoints>,
    field: &str,
) -> SdeResult<T> {
    match step_ts {
        Some(ts) => ts.clip(t0, t1, field),
        None => Ok(t1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: &str = "`test.step_ts`";

    fn ts() -> Checkpoints {
        Checkpoints::new(vec![1.0f64, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_clip_lands_on_next_checkpoint() {
        assert_eq!(ts().clip(0.5, 2.5, FIELD).unwrap(), 1.0);
        assert_eq!(ts().clip(1.5, 2.5, FIELD).unwrap(), 2.0);
        assert_eq!(ts().clip(2.5, 10.0, FIELD).unwrap(), 3.0);
    }

    #[test]
    fn test_clip_no_checkpoint_crossed() {
        assert_eq!(ts().clip(0.5, 0.9, FIELD).unwrap(), 0.9);
        assert_eq!(ts().clip(3.5, 4.0, FIELD).unwrap(), 4.0);
    }

    #[test]
    fn test_clip_start_on_checkpoint() {
        assert_eq!(ts().clip(2.0, 2.0001, FIELD).unwrap(), 2.0001);
    }

    #[test]
    fn test_clip_end_on_checkpoint() {
        // (0.5, 1.0] contains the checkpoint itself: clip is a no-op in value
        assert_eq!(ts().clip(0.5, 1.0, FIELD).unwrap(), 1.0);
    }

    #[test]
    fn test_clip_absent_checkpoints() {
        assert_eq!(clip_to_checkpoints(0.5, 2.5, None, FIELD).unwrap(), 2.5);
        let ts = ts();
        assert_eq!(
            clip_to_checkpoints(0.5, 2.5, Some(&ts), FIELD).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_precision_upcast() {
        let narrow = Checkpoints::new(vec![1.0f32, 2.0]).unwrap();
        assert_eq!(narrow.precision(), Precision::Single);
        assert_eq!(narrow.clip(0.5f32, 1.5f32, FIELD).unwrap(), 1.0f32);
        assert_eq!(narrow.clip(0.5f64, 1.5f64, FIELD).unwrap(), 1.0f64);

        let fine = Checkpoints::new(vec![0.1f32]).unwrap();
        assert_eq!(fine.clip(0.0f64, 1.0f64, FIELD).unwrap(), 0.1f32 as f64);
    }

    #[test]
    fn test_wide_checkpoints_rejected_for_narrow_times() {
        let wide = Checkpoints::new(vec![0.1f64]).unwrap();
        let err = wide.clip(0.0f32, 1.0f32, FIELD).unwrap_err();
        assert_eq!(
            err,
            SdeError::PrecisionMismatch {
                field: FIELD.to_string(),
                expected: "f32".to_string(),
                found: "f64".to_string(),
            }
        );
        assert_eq!(wide.clip(0.0f64, 1.0f64, FIELD).unwrap(), 0.1);
    }

    #[test]
    fn test_invalid_sequences() {
        assert!(Checkpoints::new(Vec::<f64>::new()).is_err());
        assert!(matches!(
            Checkpoints::new(vec![1.0, 1.0]),
            Err(SdeError::InvalidCheckpoints { index: 1, .. })
        ));
        assert!(matches!(
            Checkpoints::new(vec![1.0, f64::NAN]),
            Err(SdeError::InvalidCheckpoints { index: 1, .. })
        ));
        assert!(Checkpoints::new(vec![2.0, 1.0]).is_err());
    }
}
