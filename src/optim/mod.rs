//! Gradient-based optimizers.
//!
//! An optimizer instance is bound to exactly one estimator: it is created
//! when that estimator's training session starts and dropped when it ends.
//! Moment buffers are never shared between estimators.

pub mod adam;

pub use adam::{Adam, AdamConfig};

use crate::core::error::Result;
use crate::estimator::Estimator;

/// Updates an estimator's parameters from their accumulated gradients.
pub trait Optimizer {
    /// Reset the accumulated gradients of `estimator`
    fn zero_grad<E: Estimator + ?Sized>(&self, estimator: &mut E) {
        estimator.zero_grad();
    }

    /// Apply one update step using the current gradients
    fn step<E: Estimator + ?Sized>(&mut self, estimator: &mut E) -> Result<()>;

    /// Number of update steps applied so far
    fn steps(&self) -> u64;
}
