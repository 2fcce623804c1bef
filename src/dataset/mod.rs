//! Batches and batch streams consumed by training and evaluation.
//!
//! A [`BatchStream`] is re-iterable: every call to [`BatchStream::batches`]
//! starts a fresh pass over the same semantic dataset. The ensemble iterates
//! the training stream once per estimator and epoch, and never depends on
//! batches arriving in the same order across passes.

pub mod loader;

pub use loader::DataLoader;

use crate::core::error::{BaggingError, Result};
use crate::core::types::{ClassIndex, Score};
use ndarray::{Array1, Array2, ArrayBase, Axis};
use std::fmt;

/// Targets of a batch, indexable by row.
pub trait TargetBatch: Clone + fmt::Debug {
    /// Number of rows
    fn len(&self) -> usize;

    /// Whether the batch has no rows
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows at `indices`, in the given order
    fn select(&self, indices: &[usize]) -> Self;
}

impl TargetBatch for Array1<ClassIndex> {
    fn len(&self) -> usize {
        ArrayBase::len(self)
    }

    fn select(&self, indices: &[usize]) -> Self {
        ArrayBase::select(self, Axis(0), indices)
    }
}

impl TargetBatch for Array2<Score> {
    fn len(&self) -> usize {
        self.nrows()
    }

    fn select(&self, indices: &[usize]) -> Self {
        ArrayBase::select(self, Axis(0), indices)
    }
}

/// A paired `(inputs, targets)` batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    /// Input rows, one example per row
    pub inputs: Array2<Score>,
    /// Targets aligned with `inputs`
    pub targets: T,
}

impl<T: TargetBatch> Batch<T> {
    /// Create a batch, checking that inputs and targets have the same rows
    pub fn new(inputs: Array2<Score>, targets: T) -> Result<Self> {
        let batch = Batch { inputs, targets };
        batch.check_rows()?;
        Ok(batch)
    }

    /// Check that inputs and targets have the same number of rows.
    ///
    /// The fields are public, so batches built without [`Batch::new`] are
    /// checked again before training uses them.
    pub fn check_rows(&self) -> Result<()> {
        if self.inputs.nrows() != self.targets.len() {
            return Err(BaggingError::dimension_mismatch(
                format!("{} target rows", self.inputs.nrows()),
                format!("{} target rows", self.targets.len()),
            ));
        }
        Ok(())
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    /// Whether the batch holds no examples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sub-batch made of the rows at `indices`
    pub fn select(&self, indices: &[usize]) -> Self {
        Batch {
            inputs: self.inputs.select(Axis(0), indices),
            targets: self.targets.select(indices),
        }
    }
}

/// A re-iterable source of batches.
pub trait BatchStream {
    /// Target type of the yielded batches
    type Target: TargetBatch;

    /// Start a new pass over the stream
    fn batches(&self) -> Box<dyn Iterator<Item = Batch<Self::Target>> + '_>;
}

impl<T: TargetBatch> BatchStream for [Batch<T>] {
    type Target = T;

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_> {
        Box::new(self.iter().cloned())
    }
}

impl<T: TargetBatch> BatchStream for Vec<Batch<T>> {
    type Target = T;

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_> {
        self.as_slice().batches()
    }
}
