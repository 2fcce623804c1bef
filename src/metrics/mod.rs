//! Training progress and evaluation reporting.
//!
//! Progress lines are plain values ([`BatchLog`], [`EvaluationLog`]) whose
//! `Display` implementation is the wire format. Where they go is decided by a
//! [`TrainingReporter`]: stdout, the `log` facade, or an in-memory record.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bagging_rust::metrics::{BatchLog, RecordingReporter, TrainingReporter};
//!
//! let mut reporter = RecordingReporter::new();
//! reporter.on_batch(&BatchLog {
//!     estimator: 0,
//!     epoch: 0,
//!     batch: 0,
//!     loss: 0.69315,
//!     correct: Some((3, 4)),
//! });
//! assert_eq!(
//!     reporter.lines()[0],
//!     "Estimator: 000 | Epoch: 000 | Batch: 000 | Loss: 0.69315 | Correct: 3/4"
//! );
//! ```

pub mod reporter;

pub use reporter::{LogReporter, RecordingReporter, StdoutReporter, TrainingReporter};

use crate::core::types::TaskKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One periodic progress line of an estimator's training loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchLog {
    /// Estimator index within the ensemble
    pub estimator: usize,
    /// Epoch within the current `fit` call, starting at 0
    pub epoch: usize,
    /// Batch index within the epoch, starting at 0
    pub batch: usize,
    /// Loss on the bootstrap subset of the batch
    pub loss: f64,
    /// `(correct, total)` on the bootstrap subset, classification only
    pub correct: Option<(usize, usize)>,
}

impl fmt::Display for BatchLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimator: {:03} | Epoch: {:03} | Batch: {:03} | Loss: {:.5}",
            self.estimator, self.epoch, self.batch, self.loss
        )?;
        if let Some((correct, total)) = self.correct {
            write!(f, " | Correct: {}/{}", correct, total)?;
        }
        Ok(())
    }
}

/// Result of one `predict` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationLog {
    /// Task the metric belongs to
    pub task: TaskKind,
    /// Accuracy in percent, or mean of per-batch MSE
    pub value: f64,
}

impl fmt::Display for EvaluationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.task {
            TaskKind::Classification => write!(f, "Testing Accuracy: {:.3} %", self.value),
            TaskKind::Regression => write!(f, "Testing MSE: {:.5}", self.value),
        }
    }
}
