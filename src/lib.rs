//! # Bagging Rust
//!
//! Bootstrap-aggregating ("bagging") ensembles of gradient-trained
//! estimators, written in pure Rust on top of `ndarray`.
//!
//! Each estimator of an ensemble is trained with its own optimizer on a
//! fresh bootstrap subset of every mini-batch, and predictions are combined
//! by an unweighted mean: softmax probabilities for classification, raw
//! outputs for regression.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bagging_rust::{BaggingRegressor, ConfigBuilder, DataLoader, Mlp};
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! bagging_rust::init();
//!
//! let inputs = Array2::from_shape_fn((256, 3), |(i, j)| ((i * 7 + j * 3) % 11) as f64 / 11.0);
//! let targets = inputs.sum_axis(ndarray::Axis(1)).insert_axis(ndarray::Axis(1));
//! let train = DataLoader::new(inputs, targets, 32)?.with_shuffle(true).with_seed(1);
//!
//! let config = ConfigBuilder::new()
//!     .n_estimators(5)
//!     .output_dim(1)
//!     .epochs(20)
//!     .learning_rate(1e-2)
//!     .random_seed(42)
//!     .build()?;
//!
//! let mut model = BaggingRegressor::try_new(config, |i| {
//!     Mlp::builder(3, 16, 1).dropout(0.1).seed(i as u64).build()
//! })?;
//! model.fit(&train)?;
//!
//! let mse = model.predict(&train)?;
//! println!("MSE: {:.5}", mse);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Error type, shared enumerations, defaults and logging setup
//! - [`config`]: Ensemble hyperparameters, validation and file/env loading
//! - [`dataset`]: Batches, re-iterable batch streams and an in-memory loader
//! - [`sampling`]: Bootstrap masks
//! - [`estimator`]: The base-learner contract and reference estimators
//! - [`optim`]: Per-estimator Adam optimizer
//! - [`loss`]: Cross-entropy and mean squared error
//! - [`task`]: Classification and regression strategies
//! - [`training`]: The per-estimator training loop
//! - [`ensemble`]: The ensemble coordinator and checkpoints
//! - [`metrics`]: Progress lines and reporters
//! - [`device`]: Compute device handle

#![doc(html_root_url = "https://docs.rs/bagging-rust/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Batch streams
pub mod dataset;

// Compute device
pub mod device;

// Bootstrap resampling
pub mod sampling;

// Base learners
pub mod estimator;

// Optimizers
pub mod optim;

// Losses
pub mod loss;

// Task strategies
pub mod task;

// Per-estimator training loop
pub mod training;

// Ensemble coordinator
pub mod ensemble;

// Progress reporting
pub mod metrics;

// Re-export core functionality for convenience
pub use crate::core::{
    constants::*,
    error::{BaggingError, Result},
    types::*,
};

pub use config::{ConfigBuilder, EnsembleConfig};
pub use dataset::{Batch, BatchStream, DataLoader, TargetBatch};
pub use device::Device;
pub use ensemble::{BaggingClassifier, BaggingEnsemble, BaggingRegressor, Checkpoint};
pub use estimator::{Estimator, Initializer, Linear, Mlp, MlpBuilder, Parameter};
pub use metrics::{
    BatchLog, EvaluationLog, LogReporter, RecordingReporter, StdoutReporter, TrainingReporter,
};
pub use optim::{Adam, AdamConfig, Optimizer};
pub use sampling::Resampler;
pub use task::{Classification, Regression, Task};
pub use training::{train_estimator, EstimatorHistory, TrainingParams};

// Version information
pub use crate::core::constants::BAGGING_RUST_VERSION as VERSION;

/// Install the `env_logger` backend for the `log` facade.
///
/// Optional: without it, diagnostic logging is simply discarded. Progress
/// lines printed by [`StdoutReporter`] do not depend on it.
///
/// # Examples
///
/// ```rust
/// bagging_rust::init();
/// ```
pub fn init() {
    crate::core::initialize_logging()
}
