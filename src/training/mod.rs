//! Per-estimator training.
//!
//! [`train_estimator`] runs one estimator's full epoch schedule with its own
//! optimizer and resampler. It reads nothing but its arguments, so
//! estimators could be trained on separate threads without coordination.

pub mod trainer;

pub use trainer::train_estimator;

use crate::config::EnsembleConfig;
use crate::optim::AdamConfig;
use serde::{Deserialize, Serialize};

/// Hyperparameters of one training session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Passes over the training stream
    pub epochs: usize,
    /// Report every `log_interval` batches, counted within an epoch
    pub log_interval: usize,
    /// Settings of the fresh optimizer
    pub optimizer: AdamConfig,
}

impl TrainingParams {
    /// Session settings shared by every estimator of an ensemble
    pub fn from_config(config: &EnsembleConfig) -> Self {
        TrainingParams {
            epochs: config.epochs,
            log_interval: config.log_interval,
            optimizer: config.adam_config(),
        }
    }
}

/// What happened during one estimator's training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorHistory {
    /// Estimator index within the ensemble
    pub index: usize,
    /// Optimizer steps taken
    pub steps: u64,
    /// Mean bootstrap-subset loss of each epoch
    pub epoch_losses: Vec<f64>,
    /// Mean fraction of distinct rows kept by the bootstrap masks
    pub mean_bootstrap_fraction: f64,
}

impl EstimatorHistory {
    /// Mean loss of the last epoch, if any epoch ran
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_config() {
        let config = EnsembleConfig {
            epochs: 7,
            log_interval: 3,
            learning_rate: 0.05,
            ..EnsembleConfig::default()
        };
        let params = TrainingParams::from_config(&config);
        assert_eq!(params.epochs, 7);
        assert_eq!(params.log_interval, 3);
        assert_eq!(params.optimizer.learning_rate, 0.05);
        assert_eq!(params.optimizer.weight_decay, config.weight_decay);
    }

    #[test]
    fn test_final_loss() {
        let history = EstimatorHistory {
            index: 0,
            steps: 2,
            epoch_losses: vec![0.9, 0.4],
            mean_bootstrap_fraction: 0.6,
        };
        assert_eq!(history.final_loss(), Some(0.4));
    }
}
