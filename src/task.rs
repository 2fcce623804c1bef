//! Task strategies: what distinguishes a bagging classifier from a bagging
//! regressor.
//!
//! A [`Task`] supplies the training loss, the transform applied to each
//! estimator's output before averaging, the per-batch progress count and the
//! evaluation metric. The training loop and the ensemble are written once
//! against this trait.

use crate::core::error::{BaggingError, Result};
use crate::core::types::{ClassIndex, Score, TaskKind};
use crate::dataset::TargetBatch;
use crate::loss::{self, LossOutput};

use ndarray::{Array1, Array2, ArrayView2};
use std::fmt;

/// Loss, aggregation transform and evaluation metric of a learning task.
pub trait Task: fmt::Debug + Clone + Default {
    /// Target type of training and evaluation batches
    type Target: TargetBatch;

    /// Running state of an evaluation pass
    type Evaluation: Default + fmt::Debug;

    /// Which task this is
    fn kind(&self) -> TaskKind;

    /// Training loss of raw estimator `output` against `targets`
    fn loss(&self, output: ArrayView2<'_, Score>, targets: &Self::Target) -> Result<LossOutput>;

    /// Transform applied to each estimator's raw output before averaging
    fn transform(&self, output: ArrayView2<'_, Score>) -> Array2<Score>;

    /// `(correct, total)` reported in progress lines, if the task has one
    fn correct(&self, output: ArrayView2<'_, Score>, targets: &Self::Target) -> Option<(usize, usize)>;

    /// Fold one batch of aggregated predictions into `state`
    fn accumulate(
        &self,
        state: &mut Self::Evaluation,
        aggregated: ArrayView2<'_, Score>,
        targets: &Self::Target,
    ) -> Result<()>;

    /// Final metric of an evaluation pass
    fn finish(&self, state: Self::Evaluation) -> Result<f64>;
}

/// Multi-class classification with cross-entropy training and accuracy
/// evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification;

/// Running accuracy counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccuracyState {
    /// Correctly classified examples so far
    pub correct: usize,
    /// Examples seen so far
    pub total: usize,
}

fn count_correct(scores: ArrayView2<'_, Score>, targets: &Array1<ClassIndex>) -> usize {
    loss::argmax_rows(scores)
        .iter()
        .zip(targets.iter())
        .filter(|(predicted, actual)| predicted == actual)
        .count()
}

impl Task for Classification {
    type Target = Array1<ClassIndex>;
    type Evaluation = AccuracyState;

    fn kind(&self) -> TaskKind {
        TaskKind::Classification
    }

    fn loss(&self, output: ArrayView2<'_, Score>, targets: &Self::Target) -> Result<LossOutput> {
        loss::cross_entropy(output, targets)
    }

    fn transform(&self, output: ArrayView2<'_, Score>) -> Array2<Score> {
        loss::softmax(output)
    }

    fn correct(&self, output: ArrayView2<'_, Score>, targets: &Self::Target) -> Option<(usize, usize)> {
        Some((count_correct(output, targets), targets.len()))
    }

    fn accumulate(
        &self,
        state: &mut AccuracyState,
        aggregated: ArrayView2<'_, Score>,
        targets: &Self::Target,
    ) -> Result<()> {
        if aggregated.nrows() != targets.len() {
            return Err(BaggingError::dimension_mismatch(
                format!("{} targets", aggregated.nrows()),
                format!("{} targets", targets.len()),
            ));
        }
        state.correct += count_correct(aggregated, targets);
        state.total += targets.len();
        Ok(())
    }

    fn finish(&self, state: AccuracyState) -> Result<f64> {
        if state.total == 0 {
            return Err(BaggingError::dataset("evaluation stream yielded no examples"));
        }
        Ok(100.0 * state.correct as f64 / state.total as f64)
    }
}

/// Real-valued regression with mean-squared-error training and evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Regression;

/// Running sum of per-batch MSE.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MseState {
    /// Sum of per-batch mean squared errors
    pub sum: f64,
    /// Number of batches
    pub batches: usize,
}

impl Task for Regression {
    type Target = Array2<Score>;
    type Evaluation = MseState;

    fn kind(&self) -> TaskKind {
        TaskKind::Regression
    }

    fn loss(&self, output: ArrayView2<'_, Score>, targets: &Self::Target) -> Result<LossOutput> {
        loss::mean_squared_error(output, targets.view())
    }

    fn transform(&self, output: ArrayView2<'_, Score>) -> Array2<Score> {
        output.to_owned()
    }

    fn correct(&self, _output: ArrayView2<'_, Score>, _targets: &Self::Target) -> Option<(usize, usize)> {
        None
    }

    fn accumulate(
        &self,
        state: &mut MseState,
        aggregated: ArrayView2<'_, Score>,
        targets: &Self::Target,
    ) -> Result<()> {
        state.sum += loss::mean_squared_error(aggregated, targets.view())?.value;
        state.batches += 1;
        Ok(())
    }

    /// Mean over batches, not over examples: a short final batch weighs as
    /// much as a full one.
    fn finish(&self, state: MseState) -> Result<f64> {
        if state.batches == 0 {
            return Err(BaggingError::dataset("evaluation stream yielded no batches"));
        }
        Ok(state.sum / state.batches as f64)
    }
}
