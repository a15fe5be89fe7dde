use super::Optimizer;
use crate::{FactorErr, Result};

/// Adaptive moment estimation, keeps a first (`v`) and second (`s`) moment estimate per parameter.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    v: Box<[f32]>,
    s: Box<[f32]>,
    epsilon: f32,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            v: vec![0.; len].into_boxed_slice(),
            s: vec![0.; len].into_boxed_slice(),
            epsilon,
        }
    }

    /// The first moment estimates.
    pub fn first_moments(&self) -> &[f32] {
        &self.v
    }

    /// The second moment estimates.
    pub fn second_moments(&self) -> &[f32] {
        &self.s
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        if grad.len() != params.len() {
            return Err(FactorErr::SizeMismatch {
                a: "grad",
                b: "params",
                got: grad.len(),
                expected: params.len(),
            });
        }

        if params.len() != self.v.len() {
            return Err(FactorErr::SizeMismatch {
                a: "params",
                b: "moments",
                got: params.len(),
                expected: self.v.len(),
            });
        }

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        params
            .iter_mut()
            .zip(grad)
            .zip(self.v.iter_mut())
            .zip(self.s.iter_mut())
            .for_each(|(((p, g), v), s)| {
                *v = b1 * *v + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);
                *p -= step_size * *v / (s.sqrt() + eps);
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate() {
        let mut adam = Adam::new(3, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [1., 1., 1.];

        adam.update_params(&[2., -0.5, 0.], &mut params).unwrap();

        // bias-corrected first step is lr * sign(g)
        assert!((params[0] - 0.9).abs() < 1e-4);
        assert!((params[1] - 1.1).abs() < 1e-4);
        assert_eq!(params[2], 1.);
    }

    #[test]
    fn moments_accumulate() {
        let mut adam = Adam::new(1, 0.01, 0.9, 0.999, 1e-8);
        let mut params = [0.];

        adam.update_params(&[1.], &mut params).unwrap();
        adam.update_params(&[1.], &mut params).unwrap();

        assert!((adam.first_moments()[0] - 0.19).abs() < 1e-6);
        assert!((adam.second_moments()[0] - 0.001999).abs() < 1e-6);
        assert!((params[0] + 0.02).abs() < 1e-4);
    }

    #[test]
    fn size_mismatch() {
        let mut adam = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);

        assert!(adam.update_params(&[1.], &mut [0., 0.]).is_err());
        assert!(adam.update_params(&[1., 1., 1.], &mut [0., 0., 0.]).is_err());
    }
}
