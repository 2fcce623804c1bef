//! Default hyperparameters and numeric constants.

use crate::core::types::DeviceType;

/// Default number of base estimators in an ensemble.
pub const DEFAULT_N_ESTIMATORS: usize = 10;

/// Default output dimension (number of classes, or regression targets).
pub const DEFAULT_OUTPUT_DIM: usize = 2;

/// Default learning rate of every estimator's optimizer.
pub const DEFAULT_LEARNING_RATE: f64 = 1e-3;

/// Default L2 weight decay applied by the optimizer.
pub const DEFAULT_WEIGHT_DECAY: f64 = 5e-4;

/// Default number of passes over the training stream per estimator.
pub const DEFAULT_EPOCHS: usize = 100;

/// Default number of batches between two progress lines.
pub const DEFAULT_LOG_INTERVAL: usize = 100;

/// Default exponential decay rate of Adam's first moment.
pub const DEFAULT_BETA1: f64 = 0.9;

/// Default exponential decay rate of Adam's second moment.
pub const DEFAULT_BETA2: f64 = 0.999;

/// Default denominator term of Adam.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Default compute device.
pub const DEFAULT_DEVICE_TYPE: DeviceType = DeviceType::Cpu;

/// Expected fraction of distinct rows in a bootstrap sample, `1 - 1/e`.
pub const BOOTSTRAP_EXPECTED_FRACTION: f64 = 0.632_120_558_828_557_7;

/// Crate version string
pub const BAGGING_RUST_VERSION: &str = env!("CARGO_PKG_VERSION");
