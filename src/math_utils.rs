// src/math_utils.rs
//! Numeric helpers for the variance-driven controller.
//!
//! # Inverting `(e^x - 1) / x`
//!
//! Under the Euler scheme the controlled moment of the variance process obeys
//! ```text
//! (e^x - 1) / x = z,    z = 1 + ctol * exp(-2v)
//! ```
//! and the step size is the root `x`. There is no closed form, so the root is
//! approached with Newton's method on `f(x) = (e^x - 1)/x - z`, seeded from
//! `x0 = ln z`:
//! ```text
//! x <- x - f(x) / f'(x),    f'(x) = (x e^x - e^x + 1) / x^2
//! ```
//! [`inv_expm1_over_x`] always runs [`INVERSE_ITERATIONS`] updates with no
//! convergence test, so every lane of a batched evaluation executes the same
//! instructions. Scalar callers that prefer a tolerance-driven loop can use
//! [`inv_expm1_over_x_converged`] instead and accept a data-dependent cost.

use crate::error::{SdeError, SdeResult};
use crate::scalar::Real;

/// Fixed number of Newton updates applied by [`inv_expm1_over_x`].
pub const INVERSE_ITERATIONS: usize = 10;

/// Below this magnitude the Newton slope is evaluated from its Taylor series.
const SERIES_THRESHOLD: f64 = 0.5;

/// Taylor coefficients of `(x e^x - e^x + 1) / x^2`, i.e. `(k+1)/(k+2)!`.
const SLOPE_SERIES: [f64; 9] = [
    1.0 / 2.0,
    1.0 / 3.0,
    1.0 / 8.0,
    1.0 / 30.0,
    1.0 / 144.0,
    1.0 / 840.0,
    1.0 / 5760.0,
    1.0 / 45360.0,
    1.0 / 403200.0,
];

/// `(e^x - 1) / x`, continuously extended with value 1 at `x = 0`.
pub fn expm1_over_x<T: Real>(x: T) -> T {
    if x == T::zero() {
        T::one()
    } else {
        x.exp_m1() / x
    }
}

/// Derivative of [`expm1_over_x`], stable near zero where the direct formula
/// cancels catastrophically.
fn expm1_over_x_slope<T: Real>(x: T) -> T {
    if x.abs() < T::from_double(SERIES_THRESHOLD) {
        SLOPE_SERIES
            .iter()
            .rev()
            .fold(T::zero(), |acc, &c| acc * x + T::from_double(c))
    } else {
        (x * x.exp() - x.exp_m1()) / (x * x)
    }
}

/// One Newton update towards the root of `(e^x - 1)/x = z`.
///
/// Returns `x` unchanged when the update would overflow, which keeps `x = 0`
/// a fixed point for `z = 1` and leaves non-finite seeds untouched.
fn newton_update<T: Real>(x: T, z: T) -> T {
    let next = x - (expm1_over_x(x) - z) / expm1_over_x_slope(x);
    if next.is_finite() {
        next
    } else {
        x
    }
}

/// Approximate inverse of `x -> (e^x - 1)/x` for `z >= 1`.
///
/// Seeds from `ln z` and applies exactly [`INVERSE_ITERATIONS`] Newton updates.
/// `z = 1` returns exactly zero. `z = +inf` returns `+inf`, NaN stays NaN, so
/// callers can apply their own substitution for degenerate inputs.
///
/// For very large `z` (beyond roughly `1e4`) ten updates no longer reach the
/// root; the result is then an overestimate bounded by the seed's first
/// overshoot. Step-size callers clamp far below that regime.
pub fn inv_expm1_over_x<T: Real>(z: T) -> T {
    let mut x = z.ln();
    if !x.is_finite() {
        return x;
    }
    for _ in 0..INVERSE_ITERATIONS {
        x = newton_update(x, z);
    }
    x
}

/// Tolerance-driven inverse of `x -> (e^x - 1)/x`.
///
/// Stops once successive iterates differ by less than `tol` (relative to
/// `max(1, |x|)`). Not suitable for lockstep batched evaluation.
pub fn inv_expm1_over_x_converged(z: f64, tol: f64, max_iter: usize) -> SdeResult<f64> {
    if !(z >= 1.0) || !z.is_finite() {
        return Err(SdeError::InvalidParameters {
            parameter: "z".to_string(),
            value: z,
            constraint: "must be finite and >= 1".to_string(),
        });
    }

    let mut x = z.ln();
    for _ in 0..max_iter {
        let next = newton_update(x, z);
        if (next - x).abs() <= tol * x.abs().max(1.0) {
            return Ok(next);
        }
        x = next;
    }

    Err(SdeError::NumericalInstability {
        method: "inv_expm1_over_x_converged".to_string(),
        reason: format!("no convergence after {} iterations (z = {})", max_iter, z),
    })
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
