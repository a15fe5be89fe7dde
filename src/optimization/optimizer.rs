use crate::Result;

/// Defines the strategy for updating model parameters based on calculated gradients.
///
/// The `Optimizer` trait is responsible for the mathematical transition of parameters from state `t` to `t+1`,
/// carrying whatever per-parameter state the rule needs between calls.
pub trait Optimizer {
    /// Updates the provided slice of parameters using the given gradients.
    ///
    /// # Arguments
    /// * `grad` - The gradients corresponding to the `params` slice.
    /// * `params` - A mutable slice of the current parameter values.
    ///
    /// # Returns
    /// An error if `grad` and `params` have different lengths.
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()>;
}
