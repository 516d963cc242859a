//! Random streams consumed by the simulator and injector.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of randomness threaded explicitly through one simulation run.
///
/// Draw order is part of the output contract: the same stream state and the
/// same call sequence must yield the same dataset.
pub trait RandomStream {
    /// Uniform draw from `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// `amount` distinct indices from `[0, len)`, in draw order.
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

/// ChaCha8-backed stream. The generator is portable, so a seed reproduces
/// the same sequence on every platform.
#[derive(Debug, Clone)]
pub struct SeededStream {
    rng: ChaCha8Rng,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomStream for SeededStream {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}

/// Stream that always lands at the same relative position in each range.
#[cfg(test)]
pub(crate) struct FixedStream {
    pub fraction: f64,
}

#[cfg(test)]
impl RandomStream for FixedStream {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.fraction
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (0..amount.min(len)).collect()
    }
}
