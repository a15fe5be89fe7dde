use std::ops::Range;

use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

use crate::{FactorErr, Result};

/// Maps a flat parameter buffer into the five named tensors.
///
/// Flat layout: `[bias, bias_user, bias_item, embd_user, embd_item]`, embeddings row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    pub num_user: usize,
    pub num_item: usize,
    pub num_dim: usize,
    pub bias: Range<usize>,
    pub bias_user: Range<usize>,
    pub bias_item: Range<usize>,
    pub embd_user: Range<usize>,
    pub embd_item: Range<usize>,
}

impl ParameterLayout {
    pub fn new(num_user: usize, num_item: usize, num_dim: usize) -> Self {
        let bias = 0..1;
        let bias_user = bias.end..bias.end + num_user;
        let bias_item = bias_user.end..bias_user.end + num_item;
        let embd_user = bias_item.end..bias_item.end + num_user * num_dim;
        let embd_item = embd_user.end..embd_user.end + num_item * num_dim;

        Self {
            num_user,
            num_item,
            num_dim,
            bias,
            bias_user,
            bias_item,
            embd_user,
            embd_item,
        }
    }

    /// The total amount of scalar parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.embd_item.end
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got != self.len() {
            return Err(FactorErr::SizeMismatch {
                a: "buffer",
                b: "layout",
                got,
                expected: self.len(),
            });
        }

        Ok(())
    }

    /// Borrows `buf` as the five named tensors.
    pub fn view<'a>(&self, buf: &'a [f32]) -> Result<FactorView<'a>> {
        self.check_len(buf.len())?;

        Ok(FactorView {
            bias: buf[self.bias.start],
            bias_user: ArrayView1::from(&buf[self.bias_user.clone()]),
            bias_item: ArrayView1::from(&buf[self.bias_item.clone()]),
            embd_user: ArrayView2::from_shape(
                (self.num_user, self.num_dim),
                &buf[self.embd_user.clone()],
            )?,
            embd_item: ArrayView2::from_shape(
                (self.num_item, self.num_dim),
                &buf[self.embd_item.clone()],
            )?,
        })
    }

    /// Mutably borrows `buf` as the five named tensors.
    pub fn view_mut<'a>(&self, buf: &'a mut [f32]) -> Result<FactorViewMut<'a>> {
        self.check_len(buf.len())?;

        let (bias, rest) = buf.split_at_mut(self.bias_user.start);
        let (bias_user, rest) = rest.split_at_mut(self.bias_user.len());
        let (bias_item, rest) = rest.split_at_mut(self.bias_item.len());
        let (embd_user, embd_item) = rest.split_at_mut(self.embd_user.len());

        Ok(FactorViewMut {
            bias: &mut bias[0],
            bias_user: ArrayViewMut1::from(bias_user),
            bias_item: ArrayViewMut1::from(bias_item),
            embd_user: ArrayViewMut2::from_shape((self.num_user, self.num_dim), embd_user)?,
            embd_item: ArrayViewMut2::from_shape((self.num_item, self.num_dim), embd_item)?,
        })
    }
}

/// Read-only view of the model's parameters.
#[derive(Debug, Clone, Copy)]
pub struct FactorView<'a> {
    pub bias: f32,
    pub bias_user: ArrayView1<'a, f32>,
    pub bias_item: ArrayView1<'a, f32>,
    pub embd_user: ArrayView2<'a, f32>,
    pub embd_item: ArrayView2<'a, f32>,
}

/// Mutable view of the model's parameters (or of a gradient shaped like them).
#[derive(Debug)]
pub struct FactorViewMut<'a> {
    pub bias: &'a mut f32,
    pub bias_user: ArrayViewMut1<'a, f32>,
    pub bias_item: ArrayViewMut1<'a, f32>,
    pub embd_user: ArrayViewMut2<'a, f32>,
    pub embd_item: ArrayViewMut2<'a, f32>,
}
