use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{FactorErr, Result, data::ID_LIMIT};

/// The random-distribution strategy used to seed every parameter tensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializerConfig {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    UniformInclusive { low: f32, high: f32 },
    Normal { mean: f32, std_dev: f32 },
}

impl InitializerConfig {
    /// Checks the distribution's parameters describe a proper, finite distribution.
    pub fn validate(&self) -> Result<()> {
        let ok = match *self {
            Self::Const { value } => value.is_finite(),
            Self::Uniform { low, high } => low.is_finite() && high.is_finite() && low < high,
            Self::UniformInclusive { low, high } => {
                low.is_finite() && high.is_finite() && low <= high
            }
            Self::Normal { mean, std_dev } => {
                mean.is_finite() && std_dev.is_finite() && std_dev > 0.
            }
        };

        if !ok {
            return Err(FactorErr::InvalidConfig(format!(
                "invalid weight initializer {self:?}"
            )));
        }

        Ok(())
    }
}

impl Default for InitializerConfig {
    fn default() -> Self {
        Self::Normal {
            mean: 0.,
            std_dev: 0.01,
        }
    }
}

/// The update rule applied at every training step. The learning rate lives in `FactorConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
    GradientDescent,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Hyperparameters of a `FactorModel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorConfig {
    #[serde(default)]
    pub weight_initializer: InitializerConfig,
    pub num_user: usize,
    pub num_item: usize,
    #[serde(default = "default_num_dim")]
    pub num_dim: usize,
    #[serde(default = "default_num_epoch")]
    pub num_epoch: usize,
    /// Placement hint kept for callers that carry one; computation always runs on the host.
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    #[serde(default = "default_reg")]
    pub reg: f32,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default = "default_rating_min")]
    pub rating_min: f32,
    #[serde(default = "default_rating_max")]
    pub rating_max: f32,
    /// Seeds parameter initialization; `None` draws from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_num_dim() -> usize {
    20
}

fn default_num_epoch() -> usize {
    100
}

fn default_learning_rate() -> f32 {
    0.001
}

fn default_reg() -> f32 {
    0.05
}

fn default_rating_min() -> f32 {
    1.
}

fn default_rating_max() -> f32 {
    5.
}

impl FactorConfig {
    /// Creates a config with the default dimensions, epochs, learning rate and regularization.
    ///
    /// # Arguments
    /// * `weight_initializer` - How to seed the parameters at the start of every `fit`.
    /// * `num_user` - The amount of distinct users, ids range over `0..num_user`.
    /// * `num_item` - The amount of distinct items, ids range over `0..num_item`.
    pub fn new(weight_initializer: InitializerConfig, num_user: usize, num_item: usize) -> Self {
        Self {
            weight_initializer,
            num_user,
            num_item,
            num_dim: default_num_dim(),
            num_epoch: default_num_epoch(),
            device: None,
            learning_rate: default_learning_rate(),
            reg: default_reg(),
            optimizer: OptimizerConfig::default(),
            rating_min: default_rating_min(),
            rating_max: default_rating_max(),
            seed: None,
        }
    }

    /// Parses a config out of a JSON document and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config from `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Checks every field is within its domain.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(FactorErr::InvalidConfig(msg));

        if self.num_user == 0 || self.num_item == 0 {
            return invalid(format!(
                "num_user and num_item must be positive, got {} and {}",
                self.num_user, self.num_item
            ));
        }

        if self.num_user > ID_LIMIT || self.num_item > ID_LIMIT {
            return invalid(format!(
                "num_user and num_item can't exceed {ID_LIMIT}, got {} and {}",
                self.num_user, self.num_item
            ));
        }

        if self.num_dim == 0 {
            return invalid("num_dim must be positive".into());
        }

        self.weight_initializer.validate()?;

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.) {
            return invalid(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            ));
        }

        if !(self.reg.is_finite() && self.reg >= 0.) {
            return invalid(format!("reg must be non-negative, got {}", self.reg));
        }

        if !(self.rating_min <= self.rating_max) {
            return invalid(format!(
                "rating range [{}, {}] is empty",
                self.rating_min, self.rating_max
            ));
        }

        if let OptimizerConfig::Adam {
            beta1,
            beta2,
            epsilon,
        } = self.optimizer
        {
            let unit = 0.0..1.0;
            if !unit.contains(&beta1) || !unit.contains(&beta2) || !(epsilon > 0.) {
                return invalid(format!(
                    "adam needs betas in [0, 1) and a positive epsilon, got {beta1}, {beta2}, {epsilon}"
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FactorConfig::new(InitializerConfig::default(), 10, 20);

        assert_eq!(config.num_dim, 20);
        assert_eq!(config.num_epoch, 100);
        assert_eq!(config.learning_rate, 0.001);
        assert_eq!(config.reg, 0.05);
        assert_eq!((config.rating_min, config.rating_max), (1., 5.));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_defaults() {
        let json = r#"{
            "num_user": 3,
            "num_item": 2,
            "num_dim": 4,
            "weight_initializer": { "uniform": { "low": -0.1, "high": 0.1 } },
            "optimizer": "gradient_descent",
            "seed": 9
        }"#;

        let config = FactorConfig::from_json(json).unwrap();

        assert_eq!(config.num_dim, 4);
        assert_eq!(config.num_epoch, 100);
        assert_eq!(
            config.weight_initializer,
            InitializerConfig::Uniform {
                low: -0.1,
                high: 0.1
            }
        );
        assert_eq!(config.optimizer, OptimizerConfig::GradientDescent);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn json_round_trips() {
        let mut config = FactorConfig::new(InitializerConfig::Const { value: 0.5 }, 4, 4);
        config.device = Some("/cpu:0".into());

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(FactorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn invalid_values() {
        let base = FactorConfig::new(InitializerConfig::default(), 3, 3);

        let mut config = base.clone();
        config.num_user = 0;
        assert!(matches!(config.validate(), Err(FactorErr::InvalidConfig(_))));

        let mut config = base.clone();
        config.learning_rate = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.reg = -1.;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.rating_min = 6.;
        assert!(config.validate().is_err());

        let mut config = base;
        config.optimizer = OptimizerConfig::Adam {
            beta1: 1.,
            beta2: 0.999,
            epsilon: 1e-8,
        };
        assert!(config.validate().is_err());

        assert!(FactorConfig::from_json("{ \"num_user\": 1 }").is_err());
    }

    #[test]
    fn id_counts_are_bounded_by_the_exact_float_range() {
        let mut config = FactorConfig::new(InitializerConfig::default(), ID_LIMIT, 1);
        assert!(config.validate().is_ok());

        config.num_item = ID_LIMIT + 1;
        assert!(matches!(config.validate(), Err(FactorErr::InvalidConfig(_))));
    }

    #[test]
    fn initializer_parameters_are_checked() {
        let invalid = [
            InitializerConfig::Normal {
                mean: 0.,
                std_dev: -1.,
            },
            InitializerConfig::Normal {
                mean: 0.,
                std_dev: 0.,
            },
            InitializerConfig::Uniform { low: 1., high: 1. },
            InitializerConfig::UniformInclusive { low: 1., high: 0. },
            InitializerConfig::Const { value: f32::INFINITY },
        ];

        for init in invalid {
            let config = FactorConfig::new(init, 3, 3);
            assert!(
                matches!(config.validate(), Err(FactorErr::InvalidConfig(_))),
                "{init:?} should be rejected"
            );
        }

        assert!(InitializerConfig::UniformInclusive { low: 0., high: 0. }.validate().is_ok());
    }
}
