use ndarray::{Array1, Array2, ArrayViewD, aview0};

use super::layout::FactorView;
use crate::{FactorErr, Result};

/// The names under which the parameter tensors are exposed, in layout order.
pub const PARAM_NAMES: [&str; 5] = ["bias", "bias_user", "bias_item", "embd_user", "embd_item"];

/// An owned snapshot of trained parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    bias: f32,
    bias_user: Array1<f32>,
    bias_item: Array1<f32>,
    embd_user: Array2<f32>,
    embd_item: Array2<f32>,
}

impl ModelParameters {
    /// Assembles a snapshot out of its tensors.
    ///
    /// # Returns
    /// An error if the bias lengths don't match the embedding rows or the embeddings disagree
    /// on the latent dimension.
    pub fn new(
        bias: f32,
        bias_user: Array1<f32>,
        bias_item: Array1<f32>,
        embd_user: Array2<f32>,
        embd_item: Array2<f32>,
    ) -> Result<Self> {
        if bias_user.len() != embd_user.nrows() {
            return Err(FactorErr::SizeMismatch {
                a: "bias_user",
                b: "embd_user",
                got: bias_user.len(),
                expected: embd_user.nrows(),
            });
        }

        if bias_item.len() != embd_item.nrows() {
            return Err(FactorErr::SizeMismatch {
                a: "bias_item",
                b: "embd_item",
                got: bias_item.len(),
                expected: embd_item.nrows(),
            });
        }

        if embd_user.ncols() != embd_item.ncols() {
            return Err(FactorErr::SizeMismatch {
                a: "embd_user",
                b: "embd_item",
                got: embd_user.ncols(),
                expected: embd_item.ncols(),
            });
        }

        Ok(Self {
            bias,
            bias_user,
            bias_item,
            embd_user,
            embd_item,
        })
    }

    pub(crate) fn from_view(view: FactorView<'_>) -> Self {
        Self {
            bias: view.bias,
            bias_user: view.bias_user.to_owned(),
            bias_item: view.bias_item.to_owned(),
            embd_user: view.embd_user.to_owned(),
            embd_item: view.embd_item.to_owned(),
        }
    }

    pub fn view(&self) -> FactorView<'_> {
        FactorView {
            bias: self.bias,
            bias_user: self.bias_user.view(),
            bias_item: self.bias_item.view(),
            embd_user: self.embd_user.view(),
            embd_item: self.embd_item.view(),
        }
    }

    #[inline]
    pub fn num_user(&self) -> usize {
        self.embd_user.nrows()
    }

    #[inline]
    pub fn num_item(&self) -> usize {
        self.embd_item.nrows()
    }

    #[inline]
    pub fn num_dim(&self) -> usize {
        self.embd_user.ncols()
    }

    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    #[inline]
    pub fn bias_user(&self) -> &Array1<f32> {
        &self.bias_user
    }

    #[inline]
    pub fn bias_item(&self) -> &Array1<f32> {
        &self.bias_item
    }

    #[inline]
    pub fn embd_user(&self) -> &Array2<f32> {
        &self.embd_user
    }

    #[inline]
    pub fn embd_item(&self) -> &Array2<f32> {
        &self.embd_item
    }

    /// Looks up a tensor by name, the global bias comes back as a 0-dimensional array.
    pub fn get(&self, name: &str) -> Option<ArrayViewD<'_, f32>> {
        let view = match name {
            "bias" => aview0(&self.bias).into_dyn(),
            "bias_user" => self.bias_user.view().into_dyn(),
            "bias_item" => self.bias_item.view().into_dyn(),
            "embd_user" => self.embd_user.view().into_dyn(),
            "embd_item" => self.embd_item.view().into_dyn(),
            _ => return None,
        };

        Some(view)
    }

    /// Iterates `(name, tensor)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ArrayViewD<'_, f32>)> {
        PARAM_NAMES
            .into_iter()
            .filter_map(|name| self.get(name).map(|view| (name, view)))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn params() -> ModelParameters {
        ModelParameters::new(
            0.5,
            array![1., 2., 3.],
            array![4., 5.],
            array![[1.], [2.], [3.]],
            array![[4.], [5.]],
        )
        .unwrap()
    }

    #[test]
    fn named_access() {
        let params = params();

        assert_eq!(params.get("bias").unwrap().shape(), &[] as &[usize]);
        assert_eq!(params.get("bias").unwrap().first(), Some(&0.5));
        assert_eq!(params.get("bias_user").unwrap().shape(), &[3]);
        assert_eq!(params.get("embd_item").unwrap().shape(), &[2, 1]);
        assert!(params.get("missing").is_none());

        let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, PARAM_NAMES);
    }

    #[test]
    fn mismatched_shapes() {
        let err = ModelParameters::new(
            0.,
            array![1., 2.],
            array![4., 5.],
            array![[1.], [2.], [3.]],
            array![[4.], [5.]],
        );
        assert!(matches!(err, Err(FactorErr::SizeMismatch { a: "bias_user", .. })));

        let err = ModelParameters::new(
            0.,
            array![1.],
            array![4.],
            array![[1., 2.]],
            array![[4.]],
        );
        assert!(matches!(err, Err(FactorErr::SizeMismatch { a: "embd_user", .. })));
    }
}
