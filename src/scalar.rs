// src/scalar.rs
//! Real scalar abstraction shared by the controllers.
//!
//! Controllers are generic over the floating type used for times and states.
//! Checkpoint sequences remember the precision they were built from, so a
//! comparison against solver times can refuse to run when landing on a
//! checkpoint would round it to a narrower time type.

use num_traits::Float;
use std::fmt::{self, Debug};

/// Storage precision of a floating value, ordered from narrow to wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    Single,
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "f32"),
            Precision::Double => write!(f, "f64"),
        }
    }
}

/// Floating type usable for times and state components.
pub trait Real: Float + Debug + Send + Sync + 'static {
    const PRECISION: Precision;

    fn to_double(self) -> f64;

    fn from_double(value: f64) -> Self;
}

impl Real for f32 {
    const PRECISION: Precision = Precision::Single;

    fn to_double(self) -> f64 {
        self as f64
    }

    fn from_double(value: f64) -> Self {
        value as f32
    }
}

impl Real for f64 {
    const PRECISION: Precision = Precision::Double;

    fn to_double(self) -> f64 {
        self
    }

    fn from_double(value: f64) -> Self {
        value
    }
}

/// Replace non-finite values: NaN and -inf map to `lo`, +inf maps to `hi`.
pub fn nan_to_num<T: Real>(value: T, lo: T, hi: T) -> T {
    if value.is_nan() {
        lo
    } else if value == T::infinity() {
        hi
    } else if value == T::neg_infinity() {
        lo
    } else {
        value
    }
}

/// Clamp into `[lo, hi]`. NaN inputs are expected to be filtered first.
pub fn clamp<T: Real>(value: T, lo: T, hi: T) -> T {
    value.max(lo).min(hi)
}
