//! Seeded random source shared by every generator in a run.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Random source for one population run.
///
/// Every run owns its own `Random`, so runs with the same seed, schema and
/// overrides produce the same values.
#[derive(Debug, Clone)]
pub struct Random {
    rng: StdRng,
    seed: u64,
}

impl Random {
    /// Create a random source with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a random source seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    /// The seed this source started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Random integer in `[min, max]`.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Random size in `[min, max]`.
    pub fn usize_range(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Random float in `[min, max]`.
    pub fn f64_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// True with the given probability, clamped to `[0, 1]`.
    pub fn dice_roll(&mut self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    pub fn true_or_false(&mut self) -> bool {
        self.rng.random()
    }

    /// Random letter from `A` to `Z`.
    pub fn upper_case_letter(&mut self) -> char {
        char::from(self.rng.random_range(b'A'..=b'Z'))
    }

    /// Random upper-case string with a length in `[min, max]`.
    pub fn upper_case_alphabetic(&mut self, min: usize, max: usize) -> String {
        let len = self.usize_range(min, max);
        (0..len).map(|_| self.upper_case_letter()).collect()
    }

    /// Random number with exactly `digits` digits and no leading zero.
    pub fn digits(&mut self, digits: usize) -> String {
        let mut result = String::with_capacity(digits);
        for i in 0..digits {
            let digit = if i == 0 {
                self.rng.random_range(1..10u8)
            } else {
                self.rng.random_range(0..10u8)
            };
            result.push(char::from(b'0' + digit));
        }
        result
    }

    /// Pick one element of a slice.
    pub fn one_of<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Fill a buffer with random bytes.
    pub fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.rng.fill(bytes);
    }

    /// Direct access to the underlying RNG.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// Seed for the `index`-th run derived from a base seed.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    base.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15))
}
