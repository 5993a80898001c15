//! Bounded randomized reputation scoring.

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::discovery::platform::ReputationParams;

/// `clamp(base + uniform(-variance, variance), 1, 100)`, drawn from `rng`.
pub fn score(rng: &mut StdRng, base: i32, variance: i32) -> u8 {
    let spread = variance.saturating_abs();
    let offset = match Uniform::new_inclusive(-spread, spread) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0,
    };
    base.saturating_add(offset).clamp(1, 100) as u8
}

/// Engine-owned random source for reputation scores.
pub struct ReputationScorer {
    rng: StdRng,
}

impl ReputationScorer {
    /// A fixed `seed` makes the score sequence reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn score(&mut self, params: ReputationParams) -> u8 {
        score(&mut self.rng, params.base, params.variance)
    }
}
