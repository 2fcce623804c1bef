//! In-memory mini-batch loader.

use crate::core::error::{BaggingError, Result};
use crate::core::types::Score;
use crate::dataset::{Batch, BatchStream, TargetBatch};

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Splits an in-memory dataset into fixed-size batches.
///
/// The final batch is shorter when the number of examples is not a multiple
/// of `batch_size`. With shuffling enabled, every pass draws a new
/// permutation; a seeded loader derives pass `k`'s permutation from
/// `seed + k`, so a sequence of passes is reproducible.
#[derive(Debug)]
pub struct DataLoader<T> {
    inputs: Array2<Score>,
    targets: T,
    batch_size: usize,
    shuffle: bool,
    seed: Option<u64>,
    pass: AtomicU64,
}

impl<T: Clone> Clone for DataLoader<T> {
    fn clone(&self) -> Self {
        DataLoader {
            inputs: self.inputs.clone(),
            targets: self.targets.clone(),
            batch_size: self.batch_size,
            shuffle: self.shuffle,
            seed: self.seed,
            pass: AtomicU64::new(self.pass.load(Ordering::Relaxed)),
        }
    }
}

impl<T: TargetBatch> DataLoader<T> {
    /// Create a loader over `inputs`/`targets`
    pub fn new(inputs: Array2<Score>, targets: T, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(BaggingError::invalid_parameter(
                "batch_size",
                "0",
                "must be at least 1",
            ));
        }
        if inputs.nrows() != targets.len() {
            return Err(BaggingError::dimension_mismatch(
                format!("{} target rows", inputs.nrows()),
                format!("{} target rows", targets.len()),
            ));
        }

        Ok(DataLoader {
            inputs,
            targets,
            batch_size,
            shuffle: false,
            seed: None,
            pass: AtomicU64::new(0),
        })
    }

    /// Reshuffle the examples at the start of every pass
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Seed the shuffling permutation
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of examples in the dataset
    pub fn num_examples(&self) -> usize {
        self.inputs.nrows()
    }

    /// Number of batches yielded per pass
    pub fn num_batches(&self) -> usize {
        self.num_examples().div_ceil(self.batch_size)
    }

    /// Configured batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.num_examples()).collect();
        if self.shuffle {
            let pass = self.pass.fetch_add(1, Ordering::Relaxed);
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(pass)),
                None => StdRng::from_entropy(),
            };
            order.shuffle(&mut rng);
        }
        order
    }
}

impl<T: TargetBatch> BatchStream for DataLoader<T> {
    type Target = T;

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_> {
        let order = self.order();
        let chunks: Vec<Vec<usize>> = order
            .chunks(self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        Box::new(chunks.into_iter().map(move |rows| Batch {
            inputs: self.inputs.select(Axis(0), &rows),
            targets: self.targets.select(&rows),
        }))
    }
}
