//! Randomness behind an injectable trait
//!
//! Engines draw every random value through [`RandomSource`] so tests can
//! pin outcomes exactly. Production rounds use [`ThreadRandom`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of the random draws a round consumes
pub trait RandomSource {
    /// Uniform draw in `[0, bound)`
    fn next_below(&mut self, bound: u32) -> u32;

    /// Uniform draw in `[0.0, 1.0)`
    fn next_unit(&mut self) -> f64;
}

/// Thread-local OS-seeded randomness for live play
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl ThreadRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        rand::thread_rng().gen_range(0..bound)
    }

    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic randomness from a fixed seed
#[derive(Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }

    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Scripted draws for tests that need an exact sequence
///
/// Integer and unit draws pop from separate queues; an exhausted queue
/// yields zero so a partially scripted test stays predictable.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<u32>,
    units: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = u32>, units: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            units: units.into_iter().collect(),
        }
    }

    pub fn with_draws(draws: impl IntoIterator<Item = u32>) -> Self {
        Self::new(draws, [])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.draws.pop_front().map(|v| v % bound).unwrap_or(0)
    }

    fn next_unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.0)
    }
}
