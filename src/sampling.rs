//! Bootstrap resampling of mini-batches.
//!
//! Each training step of an estimator sees only the rows picked by
//! [`Resampler::bootstrap_mask`]: `B` draws with replacement from `[0, B)`,
//! with duplicates removed. The mask therefore holds between `1` and `B`
//! distinct, ascending indices, about `B * (1 - 1/e)` of them on average.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draw a de-duplicated bootstrap index set for a batch of `batch_size` rows.
///
/// Returns an empty set only when `batch_size` is zero.
pub fn bootstrap_indices<R: Rng + ?Sized>(rng: &mut R, batch_size: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..batch_size)
        .map(|_| rng.gen_range(0..batch_size))
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Source of bootstrap masks for one estimator.
#[derive(Debug, Clone)]
pub struct Resampler {
    rng: StdRng,
}

impl Resampler {
    /// Resampler seeded from entropy
    pub fn new() -> Self {
        Resampler {
            rng: StdRng::from_entropy(),
        }
    }

    /// Resampler with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Resampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    /// Draw a fresh mask for a batch of `batch_size` rows
    pub fn bootstrap_mask(&mut self, batch_size: usize) -> Vec<usize> {
        bootstrap_indices(&mut self.rng, batch_size)
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}
