//! Fundamental data types and enumerations shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar type used for inputs, outputs, losses and parameters.
pub type Score = f64;

/// Class index type used for classification targets.
pub type ClassIndex = usize;

/// Device type enumeration for computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// CPU-based computation
    Cpu,
    /// GPU-based computation (not available in this version)
    Gpu,
}

impl Default for DeviceType {
    fn default() -> Self {
        DeviceType::Cpu
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Cpu => write!(f, "cpu"),
            DeviceType::Gpu => write!(f, "gpu"),
        }
    }
}

/// Learning task served by an ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Multi-class classification, targets are class indices
    Classification,
    /// Real-valued regression, targets have the output's shape
    Regression,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Classification => write!(f, "classification"),
            TaskKind::Regression => write!(f, "regression"),
        }
    }
}

/// Lifecycle of an ensemble.
///
/// `fit` may be called again from any state; `predict` may be called any
/// number of times once construction succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnsembleState {
    /// Estimators are initialized but have never been fitted
    Uninitialized,
    /// A `fit` call is in progress
    Training,
    /// The last `fit` call completed for every estimator
    Trained,
    /// The last `fit` call failed; `completed` estimators finished training
    PartiallyTrained {
        /// Number of estimators that completed the full epoch schedule
        completed: usize,
    },
    /// Estimators are in evaluation mode (a `predict` ran after training)
    Evaluating,
}

impl fmt::Display for EnsembleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnsembleState::Uninitialized => write!(f, "uninitialized"),
            EnsembleState::Training => write!(f, "training"),
            EnsembleState::Trained => write!(f, "trained"),
            EnsembleState::PartiallyTrained { completed } => {
                write!(f, "partially trained ({} estimators)", completed)
            }
            EnsembleState::Evaluating => write!(f, "evaluating"),
        }
    }
}
