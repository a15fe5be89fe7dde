use ndarray::{Array1, Array2, Axis};

use super::layout::FactorView;
use crate::{FactorErr, Result};

/// The parameter rows touched by a batch, one row per record.
#[derive(Debug, Clone)]
pub(crate) struct Gathered {
    pub bias_user: Array1<f32>,
    pub bias_item: Array1<f32>,
    pub embd_user: Array2<f32>,
    pub embd_item: Array2<f32>,
}

impl Gathered {
    /// Gathers the bias and embedding rows of every `(users[k], items[k])` pair.
    ///
    /// # Returns
    /// An error if the id slices differ in length or an id is out of range.
    pub fn gather(params: &FactorView<'_>, users: &[usize], items: &[usize]) -> Result<Self> {
        if users.len() != items.len() {
            return Err(FactorErr::SizeMismatch {
                a: "items",
                b: "users",
                got: items.len(),
                expected: users.len(),
            });
        }

        check_ids(users, params.bias_user.len(), "user")?;
        check_ids(items, params.bias_item.len(), "item")?;

        Ok(Self {
            bias_user: params.bias_user.select(Axis(0), users),
            bias_item: params.bias_item.select(Axis(0), items),
            embd_user: params.embd_user.select(Axis(0), users),
            embd_item: params.embd_item.select(Axis(0), items),
        })
    }

    /// `bias + b_u + b_i + <e_u, e_i>` for every gathered pair.
    pub fn predict(&self, bias: f32) -> Array1<f32> {
        let dot = (&self.embd_user * &self.embd_item).sum_axis(Axis(1));
        dot + &self.bias_user + &self.bias_item + bias
    }
}

fn check_ids(ids: &[usize], len: usize, kind: &'static str) -> Result<()> {
    match ids.iter().find(|&&id| id >= len) {
        Some(&id) => Err(FactorErr::IdOutOfRange { kind, id, len }),
        None => Ok(()),
    }
}

/// Computes the raw, unclipped prediction of every `(users[k], items[k])` pair.
pub fn predict_raw(params: &FactorView<'_>, users: &[usize], items: &[usize]) -> Result<Array1<f32>> {
    Ok(Gathered::gather(params, users, items)?.predict(params.bias))
}

/// Computes the raw prediction of a single `(user, item)` pair.
pub fn score(params: &FactorView<'_>, user: usize, item: usize) -> Result<f32> {
    Ok(predict_raw(params, &[user], &[item])?[0])
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::model::ModelParameters;

    fn params() -> ModelParameters {
        ModelParameters::new(
            3.,
            array![0.5, -0.5],
            array![0.25, 0., -1.],
            array![[1., 2.], [0., -1.]],
            array![[1., 1.], [2., 0.], [-1., 3.]],
        )
        .unwrap()
    }

    #[test]
    fn follows_the_biased_dot_product() {
        let params = params();
        let view = params.view();

        // 3 + 0.5 + 0.25 + (1 + 2)
        assert_eq!(score(&view, 0, 0).unwrap(), 6.75);
        // 3 - 0.5 - 1 + (0 - 3)
        assert_eq!(score(&view, 1, 2).unwrap(), -1.5);

        let preds = predict_raw(&view, &[0, 1, 0], &[1, 0, 2]).unwrap();
        assert_eq!(preds.to_vec(), [3. + 0.5 + 0. + 2., 3. - 0.5 + 0.25 - 1., 3. + 0.5 - 1. + 5.]);
    }

    #[test]
    fn is_pure() {
        let params = params();
        let view = params.view();

        let first = predict_raw(&view, &[1, 0], &[2, 1]).unwrap();
        let second = predict_raw(&view, &[1, 0], &[2, 1]).unwrap();
        assert_eq!(first, second);
        assert_eq!(params, self::params());
    }

    #[test]
    fn out_of_range_ids() {
        let params = params();
        let view = params.view();

        assert!(matches!(
            score(&view, 2, 0),
            Err(FactorErr::IdOutOfRange {
                kind: "user",
                id: 2,
                len: 2
            })
        ));
        assert!(matches!(
            score(&view, 0, 3),
            Err(FactorErr::IdOutOfRange { kind: "item", .. })
        ));
        assert!(predict_raw(&view, &[0, 1], &[0]).is_err());
    }
}
