//! Common test utilities for bagging integration tests.

#![allow(dead_code)]

use bagging_rust::*;
use ndarray::{array, Array1, Array2};
use rand::prelude::*;

/// Cluster centres of the three-class toy problem
pub const CLASS_CENTRES: [[f64; 2]; 3] = [[-2.0, 0.0], [2.0, 0.0], [0.0, 2.5]];

/// Three well separated 2-d clusters with uniform jitter
pub fn create_test_data_classification(num_samples: usize, seed: u64) -> (Array2<f64>, Array1<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut inputs = Array2::zeros((num_samples, 2));
    let mut targets = Array1::zeros(num_samples);

    for i in 0..num_samples {
        let class = i % CLASS_CENTRES.len();
        let centre = CLASS_CENTRES[class];
        inputs[[i, 0]] = centre[0] + rng.gen_range(-0.5..0.5);
        inputs[[i, 1]] = centre[1] + rng.gen_range(-0.5..0.5);
        targets[i] = class;
    }

    (inputs, targets)
}

/// `y = 2 x0 - x1 + 0.5` on uniform inputs in `[-1, 1)`
pub fn create_test_data_regression(num_samples: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let inputs = Array2::from_shape_fn((num_samples, 2), |_| rng.gen_range(-1.0..1.0));
    let targets = Array2::from_shape_fn((num_samples, 1), |(i, _)| {
        2.0 * inputs[[i, 0]] - inputs[[i, 1]] + 0.5
    });
    (inputs, targets)
}

/// Configuration with a fixed seed and no output noise
pub fn test_config(n_estimators: usize, output_dim: usize, epochs: usize) -> EnsembleConfig {
    ConfigBuilder::new()
        .n_estimators(n_estimators)
        .output_dim(output_dim)
        .epochs(epochs)
        .learning_rate(0.05)
        .weight_decay(0.0)
        .log_interval(1)
        .random_seed(2024)
        .build()
        .expect("test configuration is valid")
}

/// Linear estimator with hand-picked weights
pub fn fixed_linear(weight: Array2<f64>, bias: Array2<f64>) -> Linear {
    Linear::from_weights(weight, bias).expect("consistent weight and bias shapes")
}

/// Two regression estimators computing `x` and `3 x`
pub fn fixed_regressors(index: usize) -> Result<Linear> {
    let w = if index == 0 { 1.0 } else { 3.0 };
    Linear::from_weights(array![[w]], array![[0.0]])
}

/// Snapshot of every estimator's parameter values
pub fn parameter_snapshot<E: Estimator>(estimators: &[E]) -> Vec<Vec<Array2<f64>>> {
    estimators
        .iter()
        .map(|e| e.parameters().iter().map(|p| p.value().clone()).collect())
        .collect()
}

/// Check a progress line against
/// `Estimator: NNN | Epoch: NNN | Batch: NNN | Loss: X.XXXXX[ | Correct: c/d]`
pub fn assert_progress_line(line: &str, estimator: usize, epoch: usize, batch: usize, with_correct: bool) {
    let fields: Vec<&str> = line.split(" | ").collect();
    assert_eq!(fields.len(), if with_correct { 5 } else { 4 }, "line: {}", line);
    assert_eq!(fields[0], format!("Estimator: {:03}", estimator));
    assert_eq!(fields[1], format!("Epoch: {:03}", epoch));
    assert_eq!(fields[2], format!("Batch: {:03}", batch));

    let loss = fields[3].strip_prefix("Loss: ").expect("loss field");
    let (_, decimals) = loss.split_once('.').expect("decimal point in loss");
    assert_eq!(decimals.len(), 5, "loss precision in {}", line);
    assert!(loss.parse::<f64>().is_ok());

    if with_correct {
        let counts = fields[4].strip_prefix("Correct: ").expect("correct field");
        let (correct, total) = counts.split_once('/').expect("c/d counts");
        let correct: usize = correct.parse().expect("correct count");
        let total: usize = total.parse().expect("total count");
        assert!(correct <= total);
    }
}
