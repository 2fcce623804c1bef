//! Destinations for progress lines.

use crate::metrics::{BatchLog, EvaluationLog};

/// Receives training progress and evaluation results.
///
/// Only `on_batch` is required; the other hooks default to doing nothing.
pub trait TrainingReporter {
    /// A periodic progress line (every `log_interval` batches)
    fn on_batch(&mut self, log: &BatchLog);

    /// Estimator `index` starts its training session
    fn on_estimator_start(&mut self, _index: usize) {}

    /// Estimator `index` completed its training session
    fn on_estimator_end(&mut self, _index: usize) {}

    /// A `predict` call finished
    fn on_evaluation(&mut self, _log: &EvaluationLog) {}
}

/// Prints progress lines to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutReporter;

impl TrainingReporter for StdoutReporter {
    fn on_batch(&mut self, log: &BatchLog) {
        println!("{}", log);
    }

    fn on_evaluation(&mut self, log: &EvaluationLog) {
        println!("{}", log);
    }
}

/// Routes progress lines to `log::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl TrainingReporter for LogReporter {
    fn on_batch(&mut self, log: &BatchLog) {
        log::info!("{}", log);
    }

    fn on_estimator_start(&mut self, index: usize) {
        log::debug!("Training estimator {}", index);
    }

    fn on_estimator_end(&mut self, index: usize) {
        log::debug!("Estimator {} finished", index);
    }

    fn on_evaluation(&mut self, log: &EvaluationLog) {
        log::info!("{}", log);
    }
}

/// Keeps every report in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    batches: Vec<BatchLog>,
    evaluations: Vec<EvaluationLog>,
    started: Vec<usize>,
    finished: Vec<usize>,
}

impl RecordingReporter {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress records, in arrival order
    pub fn batches(&self) -> &[BatchLog] {
        &self.batches
    }

    /// Formatted progress lines, in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.batches.iter().map(|log| log.to_string()).collect()
    }

    /// Evaluation results, in arrival order
    pub fn evaluations(&self) -> &[EvaluationLog] {
        &self.evaluations
    }

    /// Indices of estimators whose training started
    pub fn started(&self) -> &[usize] {
        &self.started
    }

    /// Indices of estimators whose training completed
    pub fn finished(&self) -> &[usize] {
        &self.finished
    }
}

impl TrainingReporter for RecordingReporter {
    fn on_batch(&mut self, log: &BatchLog) {
        self.batches.push(*log);
    }

    fn on_estimator_start(&mut self, index: usize) {
        self.started.push(index);
    }

    fn on_estimator_end(&mut self, index: usize) {
        self.finished.push(index);
    }

    fn on_evaluation(&mut self, log: &EvaluationLog) {
        self.evaluations.push(*log);
    }
}
