//! Binary checkpoints of trained ensembles.
//!
//! A checkpoint stores the configuration and every estimator's parameters,
//! encoded with `bincode`. Loading writes the stored values into an
//! ensemble whose estimators have the same layout; the estimators
//! themselves are not reconstructed from the file.

use crate::config::EnsembleConfig;
use crate::core::constants::BAGGING_RUST_VERSION;
use crate::core::error::{BaggingError, Result};
use crate::core::types::{EnsembleState, TaskKind};
use crate::ensemble::BaggingEnsemble;
use crate::estimator::{Estimator, Parameter};
use crate::task::Task;

use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Current checkpoint layout version.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Upper bound on the size of a checkpoint, 1 GiB.
const CHECKPOINT_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_little_endian()
        .with_limit(CHECKPOINT_SIZE_LIMIT)
}

/// Serialized state of an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Layout version, see [`CHECKPOINT_FORMAT_VERSION`]
    pub format_version: u32,
    /// Version of the crate that wrote the checkpoint
    pub crate_version: String,
    /// Task of the ensemble
    pub task: TaskKind,
    /// Configuration at save time
    pub config: EnsembleConfig,
    /// Parameters of each estimator, in estimator order
    pub estimators: Vec<Vec<Parameter>>,
}

impl Checkpoint {
    /// Snapshot of `ensemble`
    pub fn capture<E: Estimator, T: Task>(ensemble: &BaggingEnsemble<E, T>) -> Self {
        Checkpoint {
            format_version: CHECKPOINT_FORMAT_VERSION,
            crate_version: BAGGING_RUST_VERSION.to_string(),
            task: ensemble.task().kind(),
            config: ensemble.config().clone(),
            estimators: ensemble
                .estimators()
                .iter()
                .map(|e| e.parameters().into_iter().cloned().collect())
                .collect(),
        }
    }

    /// Write the checkpoint to `path`
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode_options().serialize_into(writer, self)?;
        Ok(())
    }

    /// Read a checkpoint from `path`
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let checkpoint: Checkpoint = bincode_options().deserialize_from(reader)?;
        if checkpoint.format_version != CHECKPOINT_FORMAT_VERSION {
            return Err(BaggingError::serialization(format!(
                "unsupported checkpoint format version {} (expected {})",
                checkpoint.format_version, CHECKPOINT_FORMAT_VERSION
            )));
        }
        Ok(checkpoint)
    }
}

impl<E: Estimator, T: Task> BaggingEnsemble<E, T> {
    /// Save the configuration and all parameters to `path`
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        Checkpoint::capture(self).write_to_file(path)?;
        log::info!("Saved checkpoint of {} estimators to {}", self.n_estimators(), path.display());
        Ok(())
    }

    /// Restore parameters and configuration from `path`.
    ///
    /// The checkpoint must come from an ensemble of the same task, estimator
    /// count and parameter layout. Nothing is modified unless every check
    /// passes. The ensemble is `Trained` afterwards.
    pub fn load_checkpoint<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let checkpoint = Checkpoint::read_from_file(path)?;
        self.restore(checkpoint)?;
        log::info!("Loaded checkpoint of {} estimators from {}", self.n_estimators(), path.display());
        Ok(())
    }

    /// Apply `checkpoint` after verifying it matches this ensemble
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if checkpoint.task != self.task.kind() {
            return Err(BaggingError::serialization(format!(
                "checkpoint is for a {} ensemble, not {}",
                checkpoint.task,
                self.task.kind()
            )));
        }
        checkpoint.config.validate()?;
        if checkpoint.config.output_dim != self.config.output_dim {
            return Err(BaggingError::dimension_mismatch(
                format!("output_dim {}", self.config.output_dim),
                format!("output_dim {}", checkpoint.config.output_dim),
            ));
        }
        if checkpoint.estimators.len() != self.estimators.len() {
            return Err(BaggingError::dimension_mismatch(
                format!("{} estimators", self.estimators.len()),
                format!("{} estimators", checkpoint.estimators.len()),
            ));
        }

        for (index, (estimator, stored)) in self.estimators.iter().zip(&checkpoint.estimators).enumerate() {
            let params = estimator.parameters();
            if params.len() != stored.len() {
                return Err(BaggingError::dimension_mismatch(
                    format!("{} parameters for estimator {}", params.len(), index),
                    format!("{} parameters", stored.len()),
                ));
            }
            for (param, saved) in params.iter().zip(stored) {
                if param.name() != saved.name() || param.shape() != saved.shape() {
                    return Err(BaggingError::dimension_mismatch(
                        format!("'{}' {:?} for estimator {}", param.name(), param.shape(), index),
                        format!("'{}' {:?}", saved.name(), saved.shape()),
                    ));
                }
            }
        }

        for (estimator, stored) in self.estimators.iter_mut().zip(checkpoint.estimators) {
            for (param, saved) in estimator.parameters_mut().into_iter().zip(stored) {
                param.set_value(saved.value().clone())?;
                param.zero_grad();
            }
        }

        let mut config = checkpoint.config;
        config.n_estimators = self.estimators.len();
        self.config = config;
        self.histories.clear();
        self.state = EnsembleState::Trained;
        Ok(())
    }
}
