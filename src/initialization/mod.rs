mod constant;
mod param_gen;
mod random;

pub use constant::ConstParamGen;
pub use param_gen::ParamGen;
pub use random::RandParamGen;

use rand::{SeedableRng, rngs::StdRng};

use crate::{Result, config::InitializerConfig};

/// Builds the generator described by `config`, with a budget of `limit` values.
///
/// # Arguments
/// * `config` - The distribution to draw from.
/// * `limit` - The total amount of parameters to initialize.
/// * `seed` - An optional seed, the OS random source is used otherwise.
///
/// # Returns
/// An error if the distribution's parameters are invalid.
pub fn build_param_gen(
    config: InitializerConfig,
    limit: usize,
    seed: Option<u64>,
) -> Result<Box<dyn ParamGen>> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let param_gen: Box<dyn ParamGen> = match config {
        InitializerConfig::Const { value } => Box::new(ConstParamGen::new(value, limit)),
        InitializerConfig::Uniform { low, high } => {
            Box::new(RandParamGen::uniform(rng, limit, low, high)?)
        }
        InitializerConfig::UniformInclusive { low, high } => {
            Box::new(RandParamGen::uniform_inclusive(rng, limit, low, high)?)
        }
        InitializerConfig::Normal { mean, std_dev } => {
            Box::new(RandParamGen::normal(rng, limit, mean, std_dev)?)
        }
    };

    Ok(param_gen)
}
