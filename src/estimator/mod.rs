//! Base-learner contract and reference estimators.
//!
//! An [`Estimator`] is an independently parameterized function from an input
//! batch to an output batch of `output_dim` columns. It owns its
//! [`Parameter`]s outright, so no two estimators of an ensemble ever share
//! weights or gradients.
//!
//! Training goes through [`Estimator::forward_train`], which records what
//! [`Estimator::backward`] needs, followed by one `backward` call that
//! accumulates gradients into each parameter. [`Estimator::forward`] is the
//! pure inference path used for aggregation and evaluation.

mod layer;
pub mod linear;
pub mod mlp;

pub use layer::Initializer;
pub use linear::Linear;
pub use mlp::{Mlp, MlpBuilder};

use crate::core::error::{BaggingError, Result};
use crate::core::types::Score;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, trainable matrix together with its accumulated gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value: Array2<Score>,
    grad: Array2<Score>,
}

impl Parameter {
    /// Create a parameter with a zero gradient
    pub fn new<S: Into<String>>(name: S, value: Array2<Score>) -> Self {
        let grad = Array2::zeros(value.raw_dim());
        Parameter {
            name: name.into(),
            value,
            grad,
        }
    }

    /// Parameter name, unique within one estimator
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    pub fn value(&self) -> &Array2<Score> {
        &self.value
    }

    /// Mutable value, used by optimizers
    pub fn value_mut(&mut self) -> &mut Array2<Score> {
        &mut self.value
    }

    /// Accumulated gradient
    pub fn grad(&self) -> &Array2<Score> {
        &self.grad
    }

    /// Shape as `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.value.dim()
    }

    /// Number of scalar entries
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the parameter has no entries
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Reset the gradient to zero
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// Add `grad` to the accumulated gradient
    pub fn accumulate_grad(&mut self, grad: ArrayView2<'_, Score>) -> Result<()> {
        if grad.dim() != self.grad.dim() {
            return Err(BaggingError::dimension_mismatch(
                format!("gradient of shape {:?} for '{}'", self.grad.dim(), self.name),
                format!("{:?}", grad.dim()),
            ));
        }
        self.grad += &grad;
        Ok(())
    }

    /// Replace the value, keeping the shape
    pub fn set_value(&mut self, value: Array2<Score>) -> Result<()> {
        if value.dim() != self.value.dim() {
            return Err(BaggingError::dimension_mismatch(
                format!("value of shape {:?} for '{}'", self.value.dim(), self.name),
                format!("{:?}", value.dim()),
            ));
        }
        self.value = value;
        Ok(())
    }
}

/// A trainable base learner.
pub trait Estimator: fmt::Debug {
    /// Number of output columns
    fn output_dim(&self) -> usize;

    /// Inference: map `inputs` to outputs without touching any state
    fn forward(&self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>>;

    /// Training forward pass: like [`forward`](Estimator::forward), but
    /// records intermediate values for `backward` and applies training-only
    /// behaviour (dropout) when in training mode
    fn forward_train(&mut self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>>;

    /// Accumulate parameter gradients for the gradient of the loss with
    /// respect to the outputs of the last `forward_train` call
    fn backward(&mut self, grad_output: ArrayView2<'_, Score>) -> Result<()>;

    /// All trainable parameters, in a stable order
    fn parameters(&self) -> Vec<&Parameter>;

    /// All trainable parameters, in the same order as `parameters`
    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    /// Switch between training (`true`) and evaluation (`false`) behaviour
    fn set_training(&mut self, training: bool);

    /// Whether training-only behaviour is enabled
    fn is_training(&self) -> bool;

    /// Total number of scalar parameters
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.len()).sum()
    }

    /// Reset every parameter's gradient
    fn zero_grad(&mut self) {
        for param in self.parameters_mut() {
            param.zero_grad();
        }
    }
}

impl<E: Estimator + ?Sized> Estimator for Box<E> {
    fn output_dim(&self) -> usize {
        (**self).output_dim()
    }

    fn forward(&self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        (**self).forward(inputs)
    }

    fn forward_train(&mut self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        (**self).forward_train(inputs)
    }

    fn backward(&mut self, grad_output: ArrayView2<'_, Score>) -> Result<()> {
        (**self).backward(grad_output)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        (**self).parameters()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        (**self).parameters_mut()
    }

    fn set_training(&mut self, training: bool) {
        (**self).set_training(training)
    }

    fn is_training(&self) -> bool {
        (**self).is_training()
    }
}
