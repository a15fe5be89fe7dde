mod adam;
mod gradient_descent;
mod optimizer;

pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use optimizer::Optimizer;

use crate::config::OptimizerConfig;

/// Builds the optimizer described by `config` for `len` parameters.
pub fn build_optimizer(config: OptimizerConfig, len: usize, learning_rate: f32) -> Box<dyn Optimizer> {
    match config {
        OptimizerConfig::Adam {
            beta1,
            beta2,
            epsilon,
        } => Box::new(Adam::new(len, learning_rate, beta1, beta2, epsilon)),
        OptimizerConfig::GradientDescent => Box::new(GradientDescent::new(learning_rate)),
    }
}
