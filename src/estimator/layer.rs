use crate::core::error::{BaggingError, Result};
use crate::core::types::Score;
use crate::estimator::Parameter;

use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

/// Weight initialization scheme of the reference estimators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    /// `U(-1/sqrt(fan_in), 1/sqrt(fan_in))` for weights and biases
    Uniform,
    /// `N(0, std^2)` for weights, zero biases
    Normal {
        /// Standard deviation
        std: f64,
    },
    /// All zeros
    Zeros,
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::Uniform
    }
}

impl Initializer {
    fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        fan_in: usize,
        shape: (usize, usize),
        is_bias: bool,
    ) -> Result<Array2<Score>> {
        match *self {
            Initializer::Uniform => {
                let bound = 1.0 / (fan_in.max(1) as f64).sqrt();
                let dist = Uniform::new_inclusive(-bound, bound);
                Ok(Array2::from_shape_simple_fn(shape, || dist.sample(&mut *rng)))
            }
            Initializer::Normal { std } => {
                if is_bias {
                    return Ok(Array2::zeros(shape));
                }
                let dist = Normal::new(0.0, std).map_err(|e| {
                    BaggingError::invalid_parameter("initializer.std", std.to_string(), e.to_string())
                })?;
                Ok(Array2::from_shape_simple_fn(shape, || dist.sample(&mut *rng)))
            }
            Initializer::Zeros => Ok(Array2::zeros(shape)),
        }
    }
}

/// Fully connected layer computing `x W + b`.
///
/// `W` has shape `(input_dim, output_dim)`, `b` has shape `(1, output_dim)`.
#[derive(Debug, Clone)]
pub(crate) struct Dense {
    pub(crate) weight: Parameter,
    pub(crate) bias: Parameter,
    cache: Option<Array2<Score>>,
}

impl Dense {
    pub(crate) fn new<R: Rng + ?Sized>(
        prefix: &str,
        input_dim: usize,
        output_dim: usize,
        init: Initializer,
        rng: &mut R,
    ) -> Result<Self> {
        let weight = init.sample(rng, input_dim, (input_dim, output_dim), false)?;
        let bias = init.sample(rng, input_dim, (1, output_dim), true)?;
        Ok(Dense {
            weight: Parameter::new(format!("{}.weight", prefix), weight),
            bias: Parameter::new(format!("{}.bias", prefix), bias),
            cache: None,
        })
    }

    /// Uniformly initialized layer; unlike [`Dense::new`] this cannot fail.
    pub(crate) fn uniform<R: Rng + ?Sized>(
        prefix: &str,
        input_dim: usize,
        output_dim: usize,
        rng: &mut R,
    ) -> Self {
        let bound = 1.0 / (input_dim.max(1) as f64).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);
        let weight = Array2::from_shape_simple_fn((input_dim, output_dim), || dist.sample(&mut *rng));
        let bias = Array2::from_shape_simple_fn((1, output_dim), || dist.sample(&mut *rng));
        Dense {
            weight: Parameter::new(format!("{}.weight", prefix), weight),
            bias: Parameter::new(format!("{}.bias", prefix), bias),
            cache: None,
        }
    }

    pub(crate) fn from_arrays(prefix: &str, weight: Array2<Score>, bias: Array2<Score>) -> Result<Self> {
        if bias.nrows() != 1 || bias.ncols() != weight.ncols() {
            return Err(BaggingError::dimension_mismatch(
                format!("bias of shape (1, {})", weight.ncols()),
                format!("{:?}", bias.dim()),
            ));
        }
        Ok(Dense {
            weight: Parameter::new(format!("{}.weight", prefix), weight),
            bias: Parameter::new(format!("{}.bias", prefix), bias),
            cache: None,
        })
    }

    #[inline]
    pub(crate) fn input_dim(&self) -> usize {
        self.weight.shape().0
    }

    #[inline]
    pub(crate) fn output_dim(&self) -> usize {
        self.weight.shape().1
    }

    fn check_input(&self, x: &ArrayView2<'_, Score>) -> Result<()> {
        if x.ncols() != self.input_dim() {
            return Err(BaggingError::dimension_mismatch(
                format!("{} input columns", self.input_dim()),
                format!("{} input columns", x.ncols()),
            ));
        }
        Ok(())
    }

    pub(crate) fn forward(&self, x: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        self.check_input(&x)?;
        Ok(x.dot(self.weight.value()) + self.bias.value())
    }

    pub(crate) fn forward_train(&mut self, x: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        let output = self.forward(x)?;
        self.cache = Some(x.to_owned());
        Ok(output)
    }

    /// Accumulates `dW = x^T g` and `db = sum_rows(g)`, returns `g W^T`.
    pub(crate) fn backward(&mut self, grad_output: ArrayView2<'_, Score>) -> Result<Array2<Score>> {
        let x = self
            .cache
            .take()
            .ok_or_else(|| BaggingError::training("backward called before forward_train"))?;
        if grad_output.dim() != (x.nrows(), self.output_dim()) {
            return Err(BaggingError::dimension_mismatch(
                format!("output gradient of shape ({}, {})", x.nrows(), self.output_dim()),
                format!("{:?}", grad_output.dim()),
            ));
        }

        let grad_weight = x.t().dot(&grad_output);
        let grad_bias = grad_output.sum_axis(Axis(0)).insert_axis(Axis(0));
        self.weight.accumulate_grad(grad_weight.view())?;
        self.bias.accumulate_grad(grad_bias.view())?;

        Ok(grad_output.dot(&self.weight.value().t()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let dense = Dense::new("fc", 16, 4, Initializer::Uniform, &mut rng).unwrap();
        let bound = 0.25;
        assert!(dense.weight.value().iter().all(|w| w.abs() <= bound));
        assert!(dense.bias.value().iter().all(|b| b.abs() <= bound));
    }

    #[test]
    fn test_normal_zero_bias() {
        let mut rng = StdRng::seed_from_u64(3);
        let dense = Dense::new("fc", 4, 3, Initializer::Normal { std: 0.1 }, &mut rng).unwrap();
        assert!(dense.bias.value().iter().all(|&b| b == 0.0));
        assert!(Dense::new("fc", 4, 3, Initializer::Normal { std: -1.0 }, &mut rng).is_err());
    }

    #[test]
    fn test_forward_and_backward() {
        let mut dense = Dense::from_arrays(
            "fc",
            array![[1.0, 0.0], [0.0, 2.0], [1.0, 1.0]],
            array![[0.5, -0.5]],
        )
        .unwrap();
        let x = array![[1.0, 2.0, 3.0], [0.0, 1.0, 0.0]];

        let y = dense.forward_train(x.view()).unwrap();
        assert_eq!(y, array![[4.5, 6.5], [0.5, 1.5]]);

        let g = array![[1.0, 0.0], [0.0, 1.0]];
        let grad_input = dense.backward(g.view()).unwrap();

        assert_eq!(dense.weight.grad(), &array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0]]);
        assert_eq!(dense.bias.grad(), &array![[1.0, 1.0]]);
        assert_abs_diff_eq!(grad_input, array![[1.0, 0.0, 1.0], [0.0, 2.0, 1.0]], epsilon = 1e-12);
    }

    #[test]
    fn test_backward_requires_forward() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dense = Dense::new("fc", 2, 2, Initializer::Zeros, &mut rng).unwrap();
        assert!(dense.backward(array![[1.0, 1.0]].view()).is_err());
    }

    #[test]
    fn test_input_width_check() {
        let mut rng = StdRng::seed_from_u64(0);
        let dense = Dense::new("fc", 3, 2, Initializer::Uniform, &mut rng).unwrap();
        assert!(dense.forward(array![[1.0, 2.0]].view()).is_err());
    }
}
