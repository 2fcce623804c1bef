//! Training losses with analytic gradients.
//!
//! Both losses average over the batch, so gradients are already scaled by
//! the number of rows (or elements) and can be handed to
//! [`Estimator::backward`](crate::estimator::Estimator::backward) unchanged.

use crate::core::error::{BaggingError, Result};
use crate::core::types::{ClassIndex, Score};

use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Scalar loss value and its gradient with respect to the outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct LossOutput {
    /// Mean loss over the batch
    pub value: Score,
    /// `d value / d output`, same shape as the output
    pub grad: Array2<Score>,
}

/// Row-wise softmax, shifted by the row maximum for stability.
pub fn softmax(logits: ArrayView2<'_, Score>) -> Array2<Score> {
    let mut probs = logits.to_owned();
    for mut row in probs.axis_iter_mut(Axis(0)) {
        let max = row.fold(Score::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    probs
}

/// Mean cross-entropy between `logits` and class indices.
pub fn cross_entropy(
    logits: ArrayView2<'_, Score>,
    targets: &Array1<ClassIndex>,
) -> Result<LossOutput> {
    let (rows, classes) = logits.dim();
    if targets.len() != rows {
        return Err(BaggingError::dimension_mismatch(
            format!("{} targets", rows),
            format!("{} targets", targets.len()),
        ));
    }
    if rows == 0 {
        return Err(BaggingError::dataset("cross-entropy of an empty batch"));
    }
    if let Some(&bad) = targets.iter().find(|&&c| c >= classes) {
        return Err(BaggingError::invalid_parameter(
            "target",
            bad.to_string(),
            format!("class index must be below {}", classes),
        ));
    }

    let mut grad = softmax(logits);
    let mut total = 0.0;
    for (i, &class) in targets.iter().enumerate() {
        let row = logits.row(i);
        let max = row.fold(Score::NEG_INFINITY, |acc, &v| acc.max(v));
        let log_sum_exp = max + row.mapv(|v| (v - max).exp()).sum().ln();
        total += log_sum_exp - row[class];
        grad[[i, class]] -= 1.0;
    }

    let scale = rows as Score;
    grad /= scale;
    Ok(LossOutput {
        value: total / scale,
        grad,
    })
}

/// Mean squared error over every element of `output`.
pub fn mean_squared_error(
    output: ArrayView2<'_, Score>,
    targets: ArrayView2<'_, Score>,
) -> Result<LossOutput> {
    if output.dim() != targets.dim() {
        return Err(BaggingError::dimension_mismatch(
            format!("targets of shape {:?}", output.dim()),
            format!("{:?}", targets.dim()),
        ));
    }
    if output.is_empty() {
        return Err(BaggingError::dataset("mean squared error of an empty batch"));
    }

    let n = output.len() as Score;
    let diff = &output - &targets;
    let value = diff.mapv(|d| d * d).sum() / n;
    Ok(LossOutput {
        value,
        grad: diff * (2.0 / n),
    })
}

/// Index of the largest entry of each row; ties go to the lowest index.
pub fn argmax_rows(scores: ArrayView2<'_, Score>) -> Array1<ClassIndex> {
    scores
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}
