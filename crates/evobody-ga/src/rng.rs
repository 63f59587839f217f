//! RNG trait abstraction for the evolutionary core
//!
//! The engine never touches a global generator. Callers inject anything that
//! implements [`GaRng`]:
//! - a seeded [`Xoshiro256StarStar`] for reproducible trials and tests
//! - `rand::thread_rng()` when determinism does not matter

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// Random number generator trait for selection, infection and mutation
pub trait GaRng {
    /// Generate random f64 in [0.0, 1.0)
    fn gen_unit(&mut self) -> f64;

    /// Generate a random index in [0, upper)
    ///
    /// `upper` must be non-zero.
    fn gen_index(&mut self, upper: usize) -> usize;

    /// Generate a random offset in [-radius, radius]
    fn gen_offset(&mut self, radius: usize) -> i64;

    /// Generate -1.0 or +1.0 with equal probability
    fn gen_sign(&mut self) -> f64;

    /// Check if a unit draw falls at or below the probability threshold
    fn check_probability(&mut self, probability: f64) -> bool {
        self.gen_unit() <= probability
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> GaRng for T {
    fn gen_unit(&mut self) -> f64 {
        rand::Rng::r#gen(self)
    }

    fn gen_index(&mut self, upper: usize) -> usize {
        rand::Rng::gen_range(self, 0..upper)
    }

    fn gen_offset(&mut self, radius: usize) -> i64 {
        let radius = radius as i64;
        rand::Rng::gen_range(self, -radius..=radius)
    }

    fn gen_sign(&mut self) -> f64 {
        if rand::Rng::r#gen::<bool>(self) {
            1.0
        } else {
            -1.0
        }
    }
}

/// Default generator used by the engine
pub type DefaultRng = Xoshiro256StarStar;

/// Create a seeded generator for reproducible runs
pub fn seeded_rng(seed: u64) -> DefaultRng {
    Xoshiro256StarStar::seed_from_u64(seed)
}
