use crate::{FactorErr, Result};

/// Clamps every prediction into `[min, max]`.
pub fn clip_ratings(pred: &mut [f32], min: f32, max: f32) {
    for p in pred {
        *p = p.max(min).min(max);
    }
}

/// Root mean squared error between `pred` and `truth`.
///
/// # Returns
/// An error if the slices differ in length or are empty.
pub fn rmse(pred: &[f32], truth: &[f32]) -> Result<f32> {
    if pred.len() != truth.len() {
        return Err(FactorErr::SizeMismatch {
            a: "pred",
            b: "truth",
            got: pred.len(),
            expected: truth.len(),
        });
    }

    if pred.is_empty() {
        return Err(FactorErr::EmptyEvaluation);
    }

    let sse: f64 = pred
        .iter()
        .zip(truth)
        .map(|(&p, &t)| (p as f64 - t as f64).powi(2))
        .sum();

    Ok((sse / pred.len() as f64).sqrt() as f32)
}
