//! Two-layer perceptron with a ReLU hidden layer and optional dropout.

use crate::core::error::{BaggingError, Result};
use crate::core::types::Score;
use crate::estimator::layer::{Dense, Initializer};
use crate::estimator::{Estimator, Parameter};

use ndarray::{Array2, ArrayView2, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `x -> relu(x W1 + b1) -> dropout -> (.) W2 + b2`.
///
/// Dropout is inverted (kept activations are scaled by `1 / (1 - p)`) and is
/// only applied by `forward_train` while in training mode. `forward` never
/// drops activations.
#[derive(Debug, Clone)]
pub struct Mlp {
    hidden: Dense,
    output: Dense,
    dropout: f64,
    training: bool,
    rng: StdRng,
    pre_activation: Option<Array2<Score>>,
    dropout_mask: Option<Array2<Score>>,
}

impl Mlp {
    /// Builder for an `input_dim -> hidden_dim -> output_dim` network
    pub fn builder(input_dim: usize, hidden_dim: usize, output_dim: usize) -> MlpBuilder {
        MlpBuilder {
            input_dim,
            hidden_dim,
            output_dim,
            dropout: 0.0,
            initializer: Initializer::Uniform,
            seed: None,
        }
    }

    /// Number of input columns
    pub fn input_dim(&self) -> usize {
        self.hidden.input_dim()
    }

    /// Width of the hidden layer
    pub fn hidden_dim(&self) -> usize {
        self.hidden.output_dim()
    }

    /// Dropout probability
    pub fn dropout(&self) -> f64 {
        self.dropout
    }
}

#[inline]
fn relu(u: &Array2<Score>) -> Array2<Score> {
    u.mapv(|v| v.max(0.0))
}

impl Estimator for Mlp {
    fn output_dim(&self) -> usize {
        self.output.output_dim()
    }

    fn forward(&self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        let u = self.hidden.forward(inputs)?;
        self.output.forward(relu(&u).view())
    }

    fn forward_train(&mut self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        let u = self.hidden.forward_train(inputs)?;
        let mut h = relu(&u);

        let mask = if self.training && self.dropout > 0.0 {
            let keep = 1.0 - self.dropout;
            let rng = &mut self.rng;
            let mask = Array2::from_shape_simple_fn(h.raw_dim(), || {
                if rng.gen::<f64>() < keep {
                    1.0 / keep
                } else {
                    0.0
                }
            });
            h *= &mask;
            Some(mask)
        } else {
            None
        };

        let out = self.output.forward_train(h.view())?;
        self.pre_activation = Some(u);
        self.dropout_mask = mask;
        Ok(out)
    }

    fn backward(&mut self, grad_output: ArrayView2<'_, Score>) -> Result<()> {
        let u = self
            .pre_activation
            .take()
            .ok_or_else(|| BaggingError::training("backward called before forward_train"))?;

        let mut grad_hidden = self.output.backward(grad_output)?;
        if let Some(mask) = self.dropout_mask.take() {
            grad_hidden *= &mask;
        }
        Zip::from(&mut grad_hidden).and(&u).for_each(|g, &v| {
            if v <= 0.0 {
                *g = 0.0;
            }
        });

        self.hidden.backward(grad_hidden.view()).map(|_| ())
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![
            &self.hidden.weight,
            &self.hidden.bias,
            &self.output.weight,
            &self.output.bias,
        ]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![
            &mut self.hidden.weight,
            &mut self.hidden.bias,
            &mut self.output.weight,
            &mut self.output.bias,
        ]
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}

/// Builder for [`Mlp`].
#[derive(Debug, Clone)]
pub struct MlpBuilder {
    input_dim: usize,
    hidden_dim: usize,
    output_dim: usize,
    dropout: f64,
    initializer: Initializer,
    seed: Option<u64>,
}

impl MlpBuilder {
    /// Dropout probability applied to hidden activations, in `[0, 1)`
    pub fn dropout(mut self, p: f64) -> Self {
        self.dropout = p;
        self
    }

    /// Weight initialization scheme
    pub fn initializer(mut self, init: Initializer) -> Self {
        self.initializer = init;
        self
    }

    /// Seed for initialization and dropout masks
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the network
    pub fn build(self) -> Result<Mlp> {
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(BaggingError::invalid_parameter(
                "dropout",
                self.dropout.to_string(),
                "must be in range [0.0, 1.0)",
            ));
        }
        if self.hidden_dim == 0 {
            return Err(BaggingError::invalid_parameter(
                "hidden_dim",
                "0",
                "must be at least 1",
            ));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let hidden = Dense::new("hidden", self.input_dim, self.hidden_dim, self.initializer, &mut rng)?;
        let output = Dense::new("output", self.hidden_dim, self.output_dim, self.initializer, &mut rng)?;

        Ok(Mlp {
            hidden,
            output,
            dropout: self.dropout,
            training: true,
            rng,
            pre_activation: None,
            dropout_mask: None,
        })
    }
}
