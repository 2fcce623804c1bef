//! The bagging training loop of a single estimator.

use crate::core::error::{BaggingError, Result};
use crate::dataset::BatchStream;
use crate::device::Device;
use crate::estimator::Estimator;
use crate::metrics::{BatchLog, TrainingReporter};
use crate::optim::{Adam, Optimizer};
use crate::sampling::Resampler;
use crate::task::Task;
use crate::training::{EstimatorHistory, TrainingParams};

/// Train `estimator` for `params.epochs` passes over `stream`.
///
/// A fresh [`Adam`] is bound to the estimator for the duration of the call.
/// Every batch is reduced to a bootstrap subset drawn from `resampler`
/// before the forward pass, and exactly one optimizer step is taken per
/// batch. Progress is reported on batches `0, log_interval, 2 * log_interval,
/// ...` of each epoch.
///
/// The first failing batch aborts the session; parameter updates made
/// before it are kept.
#[allow(clippy::too_many_arguments)]
pub fn train_estimator<E, T, S>(
    index: usize,
    estimator: &mut E,
    task: &T,
    stream: &S,
    params: &TrainingParams,
    resampler: &mut Resampler,
    device: &Device,
    reporter: &mut dyn TrainingReporter,
) -> Result<EstimatorHistory>
where
    E: Estimator + ?Sized,
    T: Task,
    S: BatchStream<Target = T::Target> + ?Sized,
{
    if params.log_interval == 0 {
        return Err(BaggingError::invalid_parameter(
            "log_interval",
            "0",
            "must be at least 1",
        ));
    }

    estimator.set_training(true);
    let mut optimizer = Adam::for_estimator(&*estimator, params.optimizer);
    let mut epoch_losses = Vec::with_capacity(params.epochs);
    let mut fraction_sum = 0.0;

    reporter.on_estimator_start(index);
    log::debug!("Training estimator {} for {} epochs", index, params.epochs);

    for epoch in 0..params.epochs {
        let mut loss_sum = 0.0;
        let mut n_batches = 0usize;

        for (batch_idx, batch) in stream.batches().enumerate() {
            let batch = device.place(batch);
            if batch.is_empty() {
                return Err(BaggingError::dataset(format!(
                    "empty batch {} in epoch {} of the training stream",
                    batch_idx, epoch
                )));
            }
            batch.check_rows()?;

            let mask = resampler.bootstrap_mask(batch.len());
            fraction_sum += mask.len() as f64 / batch.len() as f64;
            let sample = batch.select(&mask);

            optimizer.zero_grad(estimator);
            let output = estimator.forward_train(sample.inputs.view())?;
            let loss = task.loss(output.view(), &sample.targets)?;
            if !loss.value.is_finite() {
                return Err(BaggingError::numerical(format!(
                    "non-finite loss {} for estimator {} at epoch {}, batch {}",
                    loss.value, index, epoch, batch_idx
                )));
            }
            estimator.backward(loss.grad.view())?;
            optimizer.step(estimator)?;

            if batch_idx % params.log_interval == 0 {
                reporter.on_batch(&BatchLog {
                    estimator: index,
                    epoch,
                    batch: batch_idx,
                    loss: loss.value,
                    correct: task.correct(output.view(), &sample.targets),
                });
            }

            loss_sum += loss.value;
            n_batches += 1;
        }

        if n_batches == 0 {
            return Err(BaggingError::dataset("training stream yielded no batches"));
        }
        epoch_losses.push(loss_sum / n_batches as f64);
    }

    let steps = optimizer.steps();
    let mean_bootstrap_fraction = if steps > 0 {
        fraction_sum / steps as f64
    } else {
        0.0
    };
    reporter.on_estimator_end(index);
    log::debug!(
        "Estimator {} finished after {} steps, final epoch loss {:?}",
        index,
        steps,
        epoch_losses.last()
    );

    Ok(EstimatorHistory {
        index,
        steps,
        epoch_losses,
        mean_bootstrap_fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Batch;
    use crate::estimator::Linear;
    use crate::metrics::RecordingReporter;
    use crate::optim::AdamConfig;
    use crate::task::{Classification, Regression};
    use ndarray::{array, Array1, Array2};

    fn params(epochs: usize, log_interval: usize) -> TrainingParams {
        TrainingParams {
            epochs,
            log_interval,
            optimizer: AdamConfig {
                learning_rate: 0.05,
                ..AdamConfig::default()
            },
        }
    }

    fn separable_stream() -> Vec<Batch<Array1<usize>>> {
        (0..5)
            .map(|i| {
                let shift = i as f64 * 0.1;
                Batch::new(
                    array![[1.0 + shift, 0.0], [0.0, 1.0 + shift], [2.0, shift], [shift, 2.0]],
                    array![0usize, 1, 0, 1],
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_one_step_per_batch_and_periodic_logs() {
        let mut linear = Linear::with_seed(2, 2, 0);
        let mut resampler = Resampler::with_seed(1);
        let mut reporter = RecordingReporter::new();

        let history = train_estimator(
            4,
            &mut linear,
            &Classification,
            &separable_stream(),
            &params(3, 2),
            &mut resampler,
            &Device::cpu(),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(history.index, 4);
        assert_eq!(history.steps, 15);
        assert_eq!(history.epoch_losses.len(), 3);
        assert!(history.mean_bootstrap_fraction > 0.0 && history.mean_bootstrap_fraction <= 1.0);

        // Batches 0, 2, 4 of each of the three epochs.
        let logged: Vec<(usize, usize)> = reporter.batches().iter().map(|l| (l.epoch, l.batch)).collect();
        assert_eq!(logged, vec![(0, 0), (0, 2), (0, 4), (1, 0), (1, 2), (1, 4), (2, 0), (2, 2), (2, 4)]);
        // Each batch trains on its bootstrap subset, so the logged totals
        // follow the resampler's draws rather than the full batch size.
        let mut replay = Resampler::with_seed(1);
        let expected_totals: Vec<usize> = (0..15)
            .map(|_| replay.bootstrap_mask(4).len())
            .enumerate()
            .filter(|(step, _)| (step % 5) % 2 == 0)
            .map(|(_, len)| len)
            .collect();
        let totals: Vec<usize> = reporter
            .batches()
            .iter()
            .map(|log| {
                assert_eq!(log.estimator, 4);
                let (correct, total) = log.correct.unwrap();
                assert!(correct <= total);
                total
            })
            .collect();
        assert_eq!(totals, expected_totals);
        assert_eq!(reporter.started(), &[4]);
        assert_eq!(reporter.finished(), &[4]);
    }

    #[test]
    fn test_training_reduces_loss() {
        let mut linear = Linear::with_seed(2, 2, 3);
        let history = train_estimator(
            0,
            &mut linear,
            &Classification,
            &separable_stream(),
            &params(60, 100),
            &mut Resampler::with_seed(5),
            &Device::cpu(),
            &mut RecordingReporter::new(),
        )
        .unwrap();

        let first = history.epoch_losses[0];
        let last = history.final_loss().unwrap();
        assert!(last < first, "loss did not decrease: {} -> {}", first, last);
    }

    #[test]
    fn test_regression_logs_have_no_correct_count() {
        let stream = vec![Batch::new(array![[1.0], [2.0], [3.0]], array![[2.0], [4.0], [6.0]]).unwrap()];
        let mut linear = Linear::with_seed(1, 1, 0);
        let mut reporter = RecordingReporter::new();
        train_estimator(
            0,
            &mut linear,
            &Regression,
            &stream,
            &params(1, 1),
            &mut Resampler::with_seed(0),
            &Device::cpu(),
            &mut reporter,
        )
        .unwrap();
        assert_eq!(reporter.batches().len(), 1);
        assert!(reporter.batches()[0].correct.is_none());
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let stream = vec![Batch::new(Array2::zeros((0, 1)), Array2::<f64>::zeros((0, 1))).unwrap()];
        let mut linear = Linear::with_seed(1, 1, 0);
        let err = train_estimator(
            0,
            &mut linear,
            &Regression,
            &stream,
            &params(1, 1),
            &mut Resampler::with_seed(0),
            &Device::cpu(),
            &mut RecordingReporter::new(),
        )
        .unwrap_err();
        assert_eq!(err.category(), "dataset");
    }

    #[test]
    fn test_empty_stream_is_rejected() {
        let stream: Vec<Batch<Array2<f64>>> = Vec::new();
        let mut linear = Linear::with_seed(1, 1, 0);
        let result = train_estimator(
            0,
            &mut linear,
            &Regression,
            &stream,
            &params(1, 1),
            &mut Resampler::with_seed(0),
            &Device::cpu(),
            &mut RecordingReporter::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_finite_loss_fails_fast() {
        let stream = vec![Batch::new(array![[f64::NAN]], array![[1.0]]).unwrap()];
        let mut linear = Linear::with_seed(1, 1, 0);
        let before = linear.weight().clone();
        let err = train_estimator(
            0,
            &mut linear,
            &Regression,
            &stream,
            &params(2, 1),
            &mut Resampler::with_seed(0),
            &Device::cpu(),
            &mut RecordingReporter::new(),
        )
        .unwrap_err();
        assert_eq!(err.category(), "numerical");
        assert_eq!(linear.weight(), &before);
    }

    #[test]
    fn test_misaligned_batch_is_rejected() {
        let stream = vec![Batch {
            inputs: array![[0.0], [1.0], [2.0], [3.0]],
            targets: array![0usize, 1],
        }];
        let mut linear = Linear::with_seed(1, 2, 0);
        let before = linear.weight().clone();
        let err = train_estimator(
            0,
            &mut linear,
            &Classification,
            &stream,
            &params(1, 1),
            &mut Resampler::with_seed(0),
            &Device::cpu(),
            &mut RecordingReporter::new(),
        )
        .unwrap_err();
        assert_eq!(err.category(), "dimension_mismatch");
        assert_eq!(linear.weight(), &before);
    }

    #[test]
    fn test_target_shape_mismatch_propagates() {
        let stream = vec![Batch::new(array![[1.0], [2.0]], array![[1.0, 0.0], [2.0, 0.0]]).unwrap()];
        let mut linear = Linear::with_seed(1, 1, 0);
        let err = train_estimator(
            0,
            &mut linear,
            &Regression,
            &stream,
            &params(1, 1),
            &mut Resampler::with_seed(0),
            &Device::cpu(),
            &mut RecordingReporter::new(),
        )
        .unwrap_err();
        assert_eq!(err.category(), "dimension_mismatch");
    }
}
