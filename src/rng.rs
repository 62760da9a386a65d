// src/rng.rs
//! Random Number Generation for adaptive path simulation
//!
//! Every simulated path owns an independent `StdRng` derived from a base seed
//! and the path index, so results do not depend on how rayon schedules paths.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// RNG factory for reproducible parallel simulations
#[derive(Clone, Copy, Debug)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create the generator for a specific path
    pub fn create_std_rng(&self, path_id: u64) -> StdRng {
        seed_rng_from_u64(self.base_seed.wrapping_add(path_id))
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Two independent Brownian increments over a step of length `dt`.
pub fn brownian_increments<R: Rng + ?Sized>(rng: &mut R, dt: f64) -> (f64, f64) {
    let sqrt_dt = dt.sqrt();
    (sqrt_dt * get_normal_draw(rng), sqrt_dt * get_normal_draw(rng))
}
