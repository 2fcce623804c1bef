//! Ensemble configuration and its builder.
//!
//! [`EnsembleConfig`] carries the hyperparameters shared by every estimator of
//! an ensemble. [`EnsembleConfig::validate`] rejects invalid settings before
//! any training starts; the training loop itself never re-validates.

use crate::core::constants::*;
use crate::core::error::{BaggingError, Result};
use crate::core::types::DeviceType;
use crate::optim::AdamConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Hyperparameters of a bagging ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of base estimators, fixed at construction
    pub n_estimators: usize,
    /// Output dimension of every estimator (classes, or regression targets)
    pub output_dim: usize,
    /// Learning rate of each estimator's optimizer
    pub learning_rate: f64,
    /// L2 penalty added to gradients by the optimizer
    pub weight_decay: f64,
    /// Passes over the training stream per estimator and `fit` call
    pub epochs: usize,
    /// Emit a progress line every `log_interval` batches
    pub log_interval: usize,
    /// Compute device
    pub device_type: DeviceType,
    /// Seed for bootstrap resampling (`None` draws from entropy)
    pub random_seed: Option<u64>,
    /// Adam first moment decay
    pub beta1: f64,
    /// Adam second moment decay
    pub beta2: f64,
    /// Adam numerical stability term
    pub epsilon: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            n_estimators: DEFAULT_N_ESTIMATORS,
            output_dim: DEFAULT_OUTPUT_DIM,
            learning_rate: DEFAULT_LEARNING_RATE,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            epochs: DEFAULT_EPOCHS,
            log_interval: DEFAULT_LOG_INTERVAL,
            device_type: DEFAULT_DEVICE_TYPE,
            random_seed: None,
            beta1: DEFAULT_BETA1,
            beta2: DEFAULT_BETA2,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl EnsembleConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(BaggingError::invalid_parameter(
                "n_estimators",
                self.n_estimators.to_string(),
                "must be at least 1",
            ));
        }

        if self.output_dim == 0 {
            return Err(BaggingError::invalid_parameter(
                "output_dim",
                self.output_dim.to_string(),
                "must be at least 1",
            ));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(BaggingError::invalid_parameter(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be a finite value > 0.0",
            ));
        }
        if self.learning_rate > 1.0 {
            log::warn!(
                "learning_rate ({}) is unusually large for gradient-based estimators",
                self.learning_rate
            );
        }

        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return Err(BaggingError::invalid_parameter(
                "weight_decay",
                self.weight_decay.to_string(),
                "must be a finite value >= 0.0",
            ));
        }

        if self.epochs == 0 {
            return Err(BaggingError::invalid_parameter(
                "epochs",
                self.epochs.to_string(),
                "must be at least 1",
            ));
        }

        if self.log_interval == 0 {
            return Err(BaggingError::invalid_parameter(
                "log_interval",
                self.log_interval.to_string(),
                "must be at least 1",
            ));
        }

        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(BaggingError::invalid_parameter(
                    name,
                    beta.to_string(),
                    "must be in range [0.0, 1.0)",
                ));
            }
        }

        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(BaggingError::invalid_parameter(
                "epsilon",
                self.epsilon.to_string(),
                "must be a finite value > 0.0",
            ));
        }

        if self.device_type != DeviceType::Cpu {
            return Err(BaggingError::not_implemented(format!(
                "training on device '{}'",
                self.device_type
            )));
        }

        Ok(())
    }

    /// Optimizer settings derived from this configuration
    pub fn adam_config(&self) -> AdamConfig {
        AdamConfig {
            learning_rate: self.learning_rate,
            weight_decay: self.weight_decay,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
        }
    }

    /// Seed of the resampler used for estimator `index`, if seeding is enabled
    pub fn estimator_seed(&self, index: usize) -> Option<u64> {
        self.random_seed
            .map(|seed| seed.wrapping_add(index as u64))
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BaggingError::config(format!("Failed to read config file: {}", e)))?;

        let config: EnsembleConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(BaggingError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| BaggingError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(BaggingError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| BaggingError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load configuration from `BAGGING_*` environment variables on top of
    /// the defaults
    pub fn load_from_environment() -> Result<Self> {
        let mut config = EnsembleConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by `lookup` for each `BAGGING_*` key
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .trim()
                .parse()
                .map_err(|_| BaggingError::config(format!("Invalid {}", key)))
        }

        if let Some(val) = lookup("BAGGING_N_ESTIMATORS") {
            self.n_estimators = parse("BAGGING_N_ESTIMATORS", &val)?;
        }
        if let Some(val) = lookup("BAGGING_OUTPUT_DIM") {
            self.output_dim = parse("BAGGING_OUTPUT_DIM", &val)?;
        }
        if let Some(val) = lookup("BAGGING_LEARNING_RATE") {
            self.learning_rate = parse("BAGGING_LEARNING_RATE", &val)?;
        }
        if let Some(val) = lookup("BAGGING_WEIGHT_DECAY") {
            self.weight_decay = parse("BAGGING_WEIGHT_DECAY", &val)?;
        }
        if let Some(val) = lookup("BAGGING_EPOCHS") {
            self.epochs = parse("BAGGING_EPOCHS", &val)?;
        }
        if let Some(val) = lookup("BAGGING_LOG_INTERVAL") {
            self.log_interval = parse("BAGGING_LOG_INTERVAL", &val)?;
        }
        if let Some(val) = lookup("BAGGING_RANDOM_SEED") {
            self.random_seed = Some(parse("BAGGING_RANDOM_SEED", &val)?);
        }
        if let Some(val) = lookup("BAGGING_DEVICE_TYPE") {
            self.device_type = match val.trim() {
                "cpu" => DeviceType::Cpu,
                "gpu" => DeviceType::Gpu,
                _ => return Err(BaggingError::config("Invalid BAGGING_DEVICE_TYPE")),
            };
        }
        Ok(())
    }

    /// Flat string view of the hyperparameters
    pub fn as_parameter_map(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("n_estimators".to_string(), self.n_estimators.to_string());
        params.insert("output_dim".to_string(), self.output_dim.to_string());
        params.insert("learning_rate".to_string(), self.learning_rate.to_string());
        params.insert("weight_decay".to_string(), self.weight_decay.to_string());
        params.insert("epochs".to_string(), self.epochs.to_string());
        params.insert("log_interval".to_string(), self.log_interval.to_string());
        params.insert("device_type".to_string(), self.device_type.to_string());
        if let Some(seed) = self.random_seed {
            params.insert("random_seed".to_string(), seed.to_string());
        }
        params
    }
}

/// Builder pattern for creating configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: EnsembleConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: EnsembleConfig::default(),
        }
    }

    /// Set the number of estimators
    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.config.n_estimators = n_estimators;
        self
    }

    /// Set the output dimension
    pub fn output_dim(mut self, output_dim: usize) -> Self {
        self.config.output_dim = output_dim;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.config.learning_rate = rate;
        self
    }

    /// Set the weight decay
    pub fn weight_decay(mut self, decay: f64) -> Self {
        self.config.weight_decay = decay;
        self
    }

    /// Set the number of epochs
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.config.epochs = epochs;
        self
    }

    /// Set the logging interval in batches
    pub fn log_interval(mut self, interval: usize) -> Self {
        self.config.log_interval = interval;
        self
    }

    /// Set the device type
    pub fn device_type(mut self, device: DeviceType) -> Self {
        self.config.device_type = device;
        self
    }

    /// Set the random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    /// Set Adam's moment decay rates
    pub fn betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.config.beta1 = beta1;
        self.config.beta2 = beta2;
        self
    }

    /// Set Adam's epsilon
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Build the configuration, validating it
    pub fn build(self) -> Result<EnsembleConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
