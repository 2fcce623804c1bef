//! Bagging ensembles: the coordinator that owns the estimators, trains them
//! one after another and averages their predictions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bagging_rust::{BaggingClassifier, ConfigBuilder, DataLoader, Linear};
//! use ndarray::{Array1, Array2};
//!
//! # fn example() -> bagging_rust::Result<()> {
//! let config = ConfigBuilder::new()
//!     .n_estimators(5)
//!     .output_dim(3)
//!     .epochs(10)
//!     .random_seed(42)
//!     .build()?;
//! let mut ensemble = BaggingClassifier::new(config, |i| Linear::with_seed(4, 3, i as u64))?;
//!
//! let inputs = Array2::<f64>::zeros((100, 4));
//! let targets = Array1::<usize>::zeros(100);
//! let train = DataLoader::new(inputs, targets, 16)?.with_shuffle(true).with_seed(7);
//!
//! ensemble.fit(&train)?;
//! let accuracy = ensemble.predict(&train)?;
//! println!("accuracy: {:.3} %", accuracy);
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;

pub use checkpoint::Checkpoint;

use crate::config::EnsembleConfig;
use crate::core::error::{BaggingError, Result};
use crate::core::types::{EnsembleState, Score};
use crate::dataset::BatchStream;
use crate::device::Device;
use crate::estimator::Estimator;
use crate::metrics::{EvaluationLog, StdoutReporter, TrainingReporter};
use crate::sampling::Resampler;
use crate::task::{Classification, Regression, Task};
use crate::training::{train_estimator, EstimatorHistory, TrainingParams};

use ndarray::{Array2, ArrayView2};
use std::fmt;

/// A fixed-size collection of independently trained estimators whose
/// outputs are averaged.
///
/// `T` decides how outputs are trained and combined: [`Classification`]
/// averages softmax probabilities, [`Regression`] averages raw outputs.
#[derive(Debug, Clone)]
pub struct BaggingEnsemble<E, T> {
    config: EnsembleConfig,
    task: T,
    estimators: Vec<E>,
    device: Device,
    state: EnsembleState,
    histories: Vec<EstimatorHistory>,
}

/// Bagging ensemble for multi-class classification.
pub type BaggingClassifier<E> = BaggingEnsemble<E, Classification>;

/// Bagging ensemble for regression.
pub type BaggingRegressor<E> = BaggingEnsemble<E, Regression>;

impl<E: Estimator, T: Task> BaggingEnsemble<E, T> {
    /// Build `config.n_estimators` estimators with `factory(index)`.
    ///
    /// Fails if the configuration is invalid or an estimator's output
    /// dimension differs from `config.output_dim`.
    pub fn new<F>(config: EnsembleConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> E,
    {
        Self::try_new(config, |index| Ok(factory(index)))
    }

    /// Like [`new`](Self::new), for factories that can fail
    pub fn try_new<F>(config: EnsembleConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> Result<E>,
    {
        config.validate()?;
        let device = Device::new(config.device_type)?;

        let mut estimators = Vec::with_capacity(config.n_estimators);
        for index in 0..config.n_estimators {
            let estimator = factory(index)?;
            if estimator.output_dim() != config.output_dim {
                return Err(BaggingError::dimension_mismatch(
                    format!("output_dim {} for estimator {}", config.output_dim, index),
                    format!("output_dim {}", estimator.output_dim()),
                ));
            }
            estimators.push(estimator);
        }

        log::debug!(
            "Created {} ensemble of {} estimators on {}",
            T::default().kind(),
            estimators.len(),
            device.device_type()
        );

        Ok(BaggingEnsemble {
            config,
            task: T::default(),
            estimators,
            device,
            state: EnsembleState::Uninitialized,
            histories: Vec::new(),
        })
    }

    /// Train every estimator, printing progress lines to stdout
    pub fn fit<S>(&mut self, train: &S) -> Result<()>
    where
        S: BatchStream<Target = T::Target> + ?Sized,
    {
        self.fit_with_reporter(train, &mut StdoutReporter)
    }

    /// Train every estimator in index order, each with a fresh optimizer and
    /// its own resampler.
    ///
    /// `train` is iterated from the start once per estimator and epoch. On
    /// failure the estimators already trained keep their new parameters and
    /// the state becomes [`EnsembleState::PartiallyTrained`].
    pub fn fit_with_reporter<S>(&mut self, train: &S, reporter: &mut dyn TrainingReporter) -> Result<()>
    where
        S: BatchStream<Target = T::Target> + ?Sized,
    {
        self.config.validate()?;
        let params = TrainingParams::from_config(&self.config);

        self.state = EnsembleState::Training;
        self.histories.clear();
        for estimator in self.estimators.iter_mut() {
            estimator.set_training(true);
        }

        log::info!(
            "Fitting {} estimators for {} epochs (lr={}, weight_decay={})",
            self.estimators.len(),
            params.epochs,
            params.optimizer.learning_rate,
            params.optimizer.weight_decay
        );

        for (index, estimator) in self.estimators.iter_mut().enumerate() {
            let mut resampler = Resampler::from_optional_seed(self.config.estimator_seed(index));
            let result = train_estimator(
                index,
                estimator,
                &self.task,
                train,
                &params,
                &mut resampler,
                &self.device,
                reporter,
            );
            match result {
                Ok(history) => self.histories.push(history),
                Err(e) => {
                    self.state = EnsembleState::PartiallyTrained { completed: index };
                    log::error!(
                        "Training estimator {} failed ({}): {}",
                        index,
                        e.category(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        self.state = EnsembleState::Trained;
        log::info!("Fitted {} estimators", self.estimators.len());
        Ok(())
    }

    /// Unweighted mean of every estimator's transformed output.
    ///
    /// Estimators are visited in index order, so the result is reproducible
    /// bit for bit. Never modifies the ensemble.
    pub fn forward(&self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        let mut sum = Array2::<Score>::zeros((inputs.nrows(), self.config.output_dim));
        for estimator in &self.estimators {
            let output = estimator.forward(inputs)?;
            if output.dim() != sum.dim() {
                return Err(BaggingError::dimension_mismatch(
                    format!("estimator output of shape {:?}", sum.dim()),
                    format!("{:?}", output.dim()),
                ));
            }
            sum += &self.task.transform(output.view());
        }
        sum /= self.estimators.len() as Score;
        Ok(sum)
    }

    /// Evaluate on `test`, printing the result to stdout
    pub fn predict<S>(&mut self, test: &S) -> Result<f64>
    where
        S: BatchStream<Target = T::Target> + ?Sized,
    {
        self.predict_with_reporter(test, &mut StdoutReporter)
    }

    /// Switch every estimator to evaluation mode and evaluate the averaged
    /// predictions on `test`.
    ///
    /// Classification returns accuracy in percent over all examples of the
    /// stream. Regression returns the mean of the per-batch MSE values.
    /// Parameters are never modified.
    pub fn predict_with_reporter<S>(&mut self, test: &S, reporter: &mut dyn TrainingReporter) -> Result<f64>
    where
        S: BatchStream<Target = T::Target> + ?Sized,
    {
        for estimator in self.estimators.iter_mut() {
            estimator.set_training(false);
        }
        match self.state {
            EnsembleState::Uninitialized => {
                log::warn!("Predicting with an ensemble that was never fitted");
                self.state = EnsembleState::Evaluating;
            }
            EnsembleState::PartiallyTrained { completed } => {
                log::warn!(
                    "Predicting with a partially trained ensemble ({} of {} estimators completed)",
                    completed,
                    self.estimators.len()
                );
            }
            _ => self.state = EnsembleState::Evaluating,
        }

        let mut evaluation = T::Evaluation::default();
        for batch in test.batches() {
            let batch = self.device.place(batch);
            let aggregated = self.forward(batch.inputs.view())?;
            self.task.accumulate(&mut evaluation, aggregated.view(), &batch.targets)?;
        }
        let value = self.task.finish(evaluation)?;

        let log = EvaluationLog {
            task: self.task.kind(),
            value,
        };
        reporter.on_evaluation(&log);
        log::info!("{}", log);
        Ok(value)
    }

    /// Current lifecycle state
    pub fn state(&self) -> EnsembleState {
        self.state
    }

    /// Training histories of the most recent `fit`, one per completed
    /// estimator
    pub fn histories(&self) -> &[EstimatorHistory] {
        &self.histories
    }

    /// Estimators in training order
    pub fn estimators(&self) -> &[E] {
        &self.estimators
    }

    /// Number of estimators
    pub fn n_estimators(&self) -> usize {
        self.estimators.len()
    }

    /// Output dimension shared by all estimators
    pub fn output_dim(&self) -> usize {
        self.config.output_dim
    }

    /// Configuration in use
    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Task strategy
    pub fn task(&self) -> &T {
        &self.task
    }

    /// Human-readable description of the ensemble
    pub fn summary(&self) -> String {
        let n_params: usize = self.estimators.iter().map(|e| e.num_parameters()).sum();
        format!(
            "Bagging {} ensemble\n  estimators:    {}\n  output_dim:    {}\n  parameters:    {}\n  learning_rate: {}\n  weight_decay:  {}\n  epochs:        {}\n  device:        {}\n  state:         {}",
            self.task.kind(),
            self.estimators.len(),
            self.config.output_dim,
            n_params,
            self.config.learning_rate,
            self.config.weight_decay,
            self.config.epochs,
            self.device.device_type(),
            self.state
        )
    }
}

impl<E: Estimator, T: Task> fmt::Display for BaggingEnsemble<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::dataset::Batch;
    use crate::estimator::Linear;
    use crate::metrics::RecordingReporter;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    fn config(n_estimators: usize, output_dim: usize) -> EnsembleConfig {
        ConfigBuilder::new()
            .n_estimators(n_estimators)
            .output_dim(output_dim)
            .epochs(2)
            .log_interval(1)
            .learning_rate(0.01)
            .random_seed(9)
            .build()
            .unwrap()
    }

    fn classification_stream() -> Vec<Batch<Array1<usize>>> {
        vec![
            Batch::new(array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.2]], array![0usize, 1, 0]).unwrap(),
            Batch::new(array![[0.1, 1.0], [2.0, 0.0]], array![1usize, 0]).unwrap(),
        ]
    }

    #[test]
    fn test_output_dim_is_checked() {
        let result = BaggingClassifier::new(config(2, 3), |i| Linear::with_seed(2, 2, i as u64));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = config(2, 2);
        bad.epochs = 0;
        assert!(BaggingClassifier::new(bad, |i| Linear::with_seed(2, 2, i as u64)).is_err());
    }

    #[test]
    fn test_fit_updates_state_and_histories() {
        let mut ensemble = BaggingClassifier::new(config(3, 2), |i| Linear::with_seed(2, 2, i as u64)).unwrap();
        assert_eq!(ensemble.state(), EnsembleState::Uninitialized);

        let mut reporter = RecordingReporter::new();
        ensemble.fit_with_reporter(&classification_stream(), &mut reporter).unwrap();

        assert_eq!(ensemble.state(), EnsembleState::Trained);
        assert_eq!(ensemble.histories().len(), 3);
        assert!(ensemble.histories().iter().all(|h| h.steps == 4));
        assert_eq!(reporter.started(), &[0, 1, 2]);
        // 3 estimators x 2 epochs x 2 batches, log_interval 1.
        assert_eq!(reporter.batches().len(), 12);
    }

    #[test]
    fn test_forward_is_a_probability_distribution() {
        let ensemble = BaggingClassifier::new(config(4, 3), |i| Linear::with_seed(2, 3, i as u64)).unwrap();
        let probs = ensemble.forward(array![[0.3, -2.0], [5.0, 1.0]].view()).unwrap();
        assert_eq!(probs.dim(), (2, 3));
        for row in probs.rows() {
            assert!(row.iter().all(|&p| p >= 0.0));
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_predict_accuracy_and_state() {
        let mut ensemble = BaggingClassifier::new(config(2, 2), |i| Linear::with_seed(2, 2, i as u64)).unwrap();
        ensemble.fit_with_reporter(&classification_stream(), &mut RecordingReporter::new()).unwrap();

        let mut reporter = RecordingReporter::new();
        let accuracy = ensemble.predict_with_reporter(&classification_stream(), &mut reporter).unwrap();
        assert!((0.0..=100.0).contains(&accuracy));
        // Five examples in total, so accuracy is a multiple of 20 %.
        assert_abs_diff_eq!((accuracy / 20.0).round() * 20.0, accuracy, epsilon = 1e-9);
        assert_eq!(ensemble.state(), EnsembleState::Evaluating);
        assert!(ensemble.estimators().iter().all(|e| !e.is_training()));
        assert_eq!(reporter.evaluations()[0].value, accuracy);
    }

    #[test]
    fn test_failed_fit_is_partially_trained() {
        let mut ensemble = BaggingRegressor::new(config(2, 1), |i| Linear::with_seed(1, 1, i as u64)).unwrap();
        let bad = vec![Batch::new(array![[1.0], [2.0]], array![[1.0, 1.0], [2.0, 2.0]]).unwrap()];
        assert!(ensemble.fit_with_reporter(&bad, &mut RecordingReporter::new()).is_err());
        assert_eq!(ensemble.state(), EnsembleState::PartiallyTrained { completed: 0 });
        assert!(ensemble.histories().is_empty());
    }

    #[test]
    fn test_empty_evaluation_stream() {
        let mut ensemble = BaggingRegressor::new(config(2, 1), |i| Linear::with_seed(1, 1, i as u64)).unwrap();
        let empty: Vec<Batch<Array2<f64>>> = Vec::new();
        assert!(ensemble.predict_with_reporter(&empty, &mut RecordingReporter::new()).is_err());
    }

    #[test]
    fn test_summary() {
        let ensemble = BaggingRegressor::new(config(3, 1), |i| Linear::with_seed(2, 1, i as u64)).unwrap();
        let summary = ensemble.to_string();
        assert!(summary.contains("regression"));
        assert!(summary.contains("estimators:    3"));
        assert!(summary.contains("parameters:    9"));
        assert!(summary.contains("uninitialized"));
    }
}
