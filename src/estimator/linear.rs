//! Affine estimator `y = x W + b`.

use crate::core::error::Result;
use crate::core::types::Score;
use crate::estimator::layer::{Dense, Initializer};
use crate::estimator::{Estimator, Parameter};

use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Single fully connected layer, producing logits or regression values.
#[derive(Debug, Clone)]
pub struct Linear {
    layer: Dense,
    training: bool,
}

impl Linear {
    /// Uniformly initialized layer with an entropy-seeded generator
    pub fn new(input_dim: usize, output_dim: usize) -> Self {
        let mut rng = StdRng::from_entropy();
        Self::build(input_dim, output_dim, &mut rng)
    }

    /// Uniformly initialized layer with a fixed seed
    pub fn with_seed(input_dim: usize, output_dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build(input_dim, output_dim, &mut rng)
    }

    /// Layer initialized with `init`
    pub fn with_initializer(
        input_dim: usize,
        output_dim: usize,
        init: Initializer,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Linear {
            layer: Dense::new("linear", input_dim, output_dim, init, &mut rng)?,
            training: true,
        })
    }

    /// Layer with explicit weights `(input_dim, output_dim)` and bias
    /// `(1, output_dim)`
    pub fn from_weights(weight: Array2<Score>, bias: Array2<Score>) -> Result<Self> {
        Ok(Linear {
            layer: Dense::from_arrays("linear", weight, bias)?,
            training: true,
        })
    }

    fn build(input_dim: usize, output_dim: usize, rng: &mut StdRng) -> Self {
        Linear {
            layer: Dense::uniform("linear", input_dim, output_dim, rng),
            training: true,
        }
    }

    /// Number of input columns
    pub fn input_dim(&self) -> usize {
        self.layer.input_dim()
    }

    /// Weight matrix
    pub fn weight(&self) -> &Array2<Score> {
        self.layer.weight.value()
    }

    /// Bias row
    pub fn bias(&self) -> &Array2<Score> {
        self.layer.bias.value()
    }
}

impl Estimator for Linear {
    fn output_dim(&self) -> usize {
        self.layer.output_dim()
    }

    fn forward(&self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        self.layer.forward(inputs)
    }

    fn forward_train(&mut self, inputs: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        self.layer.forward_train(inputs)
    }

    fn backward(&mut self, grad_output: ArrayView2<'_, Score>) -> Result<()> {
        self.layer.backward(grad_output).map(|_| ())
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.layer.weight, &self.layer.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.layer.weight, &mut self.layer.bias]
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}
