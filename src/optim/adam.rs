//! Adam with coupled L2 weight decay.

use crate::core::constants::{
    DEFAULT_BETA1, DEFAULT_BETA2, DEFAULT_EPSILON, DEFAULT_LEARNING_RATE, DEFAULT_WEIGHT_DECAY,
};
use crate::core::error::{BaggingError, Result};
use crate::core::types::Score;
use crate::estimator::Estimator;
use crate::optim::Optimizer;

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// Adam hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Step size
    pub learning_rate: f64,
    /// L2 penalty added to the gradient before the moment updates
    pub weight_decay: f64,
    /// First moment decay
    pub beta1: f64,
    /// Second moment decay
    pub beta2: f64,
    /// Denominator term
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig {
            learning_rate: DEFAULT_LEARNING_RATE,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            beta1: DEFAULT_BETA1,
            beta2: DEFAULT_BETA2,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Adam state for one estimator.
///
/// Per parameter `p` with gradient `g`, at step `t`:
///
/// ```text
/// g = g + weight_decay * p
/// m = beta1 * m + (1 - beta1) * g
/// v = beta2 * v + (1 - beta2) * g^2
/// p = p - lr * (m / (1 - beta1^t)) / (sqrt(v / (1 - beta2^t)) + eps)
/// ```
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    first_moment: Vec<Array2<Score>>,
    second_moment: Vec<Array2<Score>>,
    t: u64,
}

impl Adam {
    /// Fresh optimizer whose moment buffers match `estimator`'s parameters
    pub fn for_estimator<E: Estimator + ?Sized>(estimator: &E, config: AdamConfig) -> Self {
        let params = estimator.parameters();
        let first_moment = params.iter().map(|p| Array2::zeros(p.shape())).collect();
        let second_moment = params.iter().map(|p| Array2::zeros(p.shape())).collect();
        Adam {
            config,
            first_moment,
            second_moment,
            t: 0,
        }
    }

    /// Hyperparameters in use
    pub fn config(&self) -> &AdamConfig {
        &self.config
    }
}

impl Optimizer for Adam {
    fn step<E: Estimator + ?Sized>(&mut self, estimator: &mut E) -> Result<()> {
        let mut params = estimator.parameters_mut();
        if params.len() != self.first_moment.len() {
            return Err(BaggingError::dimension_mismatch(
                format!("{} parameters", self.first_moment.len()),
                format!("{} parameters", params.len()),
            ));
        }
        for (param, m) in params.iter().zip(&self.first_moment) {
            if param.shape() != m.dim() {
                return Err(BaggingError::dimension_mismatch(
                    format!("'{}' of shape {:?}", param.name(), m.dim()),
                    format!("{:?}", param.shape()),
                ));
            }
        }

        self.t += 1;
        let AdamConfig {
            learning_rate,
            weight_decay,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        let bias_correction1 = 1.0 - beta1.powi(t);
        let bias_correction2 = 1.0 - beta2.powi(t);

        for ((param, m), v) in params
            .iter_mut()
            .zip(self.first_moment.iter_mut())
            .zip(self.second_moment.iter_mut())
        {
            // The gradient is read before the value is borrowed mutably.
            let grad = param.grad().clone();
            Zip::from(param.value_mut())
                .and(&grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    let g = g + weight_decay * *p;
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / bias_correction1;
                    let v_hat = *v / bias_correction2;
                    *p -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
                });
        }

        Ok(())
    }

    fn steps(&self) -> u64 {
        self.t
    }
}
