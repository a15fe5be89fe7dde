use ndarray::{Array1, ArrayView1};

use super::{
    layout::{FactorView, FactorViewMut},
    scoring::Gathered,
};
use crate::{FactorErr, Result};

/// The components of a batch's loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchLoss {
    /// Half the sum of squared residuals.
    pub error: f32,
    /// Half the sum of squares of the rows the batch touched, before scaling by `reg`.
    pub regularizer: f32,
    /// `error + reg * regularizer`.
    pub total: f32,
}

fn half_sum_sq<'a, I: IntoIterator<Item = &'a f32>>(values: I) -> f32 {
    0.5 * values.into_iter().map(|x| x * x).sum::<f32>()
}

fn residuals(
    params: &FactorView<'_>,
    gathered: &Gathered,
    ratings: ArrayView1<'_, f32>,
) -> Result<Array1<f32>> {
    let pred = gathered.predict(params.bias);
    if pred.len() != ratings.len() {
        return Err(FactorErr::SizeMismatch {
            a: "ratings",
            b: "ids",
            got: ratings.len(),
            expected: pred.len(),
        });
    }

    Ok(pred - &ratings)
}

fn compose(gathered: &Gathered, residual: &Array1<f32>, reg: f32) -> BatchLoss {
    let error = half_sum_sq(residual);
    let regularizer = half_sum_sq(&gathered.embd_user)
        + half_sum_sq(&gathered.embd_item)
        + half_sum_sq(&gathered.bias_user)
        + half_sum_sq(&gathered.bias_item);

    BatchLoss {
        error,
        regularizer,
        total: error + reg * regularizer,
    }
}

/// Evaluates the regularized loss of a batch without touching any gradient.
pub fn batch_loss(
    params: &FactorView<'_>,
    users: &[usize],
    items: &[usize],
    ratings: ArrayView1<'_, f32>,
    reg: f32,
) -> Result<BatchLoss> {
    let gathered = Gathered::gather(params, users, items)?;
    let residual = residuals(params, &gathered, ratings)?;
    Ok(compose(&gathered, &residual, reg))
}

/// Evaluates the regularized loss of a batch and adds its gradient into `grad`.
///
/// Only the rows referenced by the batch receive a gradient, once per occurrence.
pub fn loss_and_grad(
    params: &FactorView<'_>,
    users: &[usize],
    items: &[usize],
    ratings: ArrayView1<'_, f32>,
    reg: f32,
    grad: &mut FactorViewMut<'_>,
) -> Result<BatchLoss> {
    let gathered = Gathered::gather(params, users, items)?;
    let residual = residuals(params, &gathered, ratings)?;

    *grad.bias += residual.sum();

    for (k, (&u, &i)) in users.iter().zip(items).enumerate() {
        let r = residual[k];
        let embd_user = gathered.embd_user.row(k);
        let embd_item = gathered.embd_item.row(k);

        grad.bias_user[u] += r + reg * gathered.bias_user[k];
        grad.bias_item[i] += r + reg * gathered.bias_item[k];

        let mut grad_user = grad.embd_user.row_mut(u);
        grad_user.scaled_add(r, &embd_item);
        grad_user.scaled_add(reg, &embd_user);

        let mut grad_item = grad.embd_item.row_mut(i);
        grad_item.scaled_add(r, &embd_user);
        grad_item.scaled_add(reg, &embd_item);
    }

    Ok(compose(&gathered, &residual, reg))
}
