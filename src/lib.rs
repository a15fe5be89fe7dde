pub mod config;
pub mod data;
mod error;
pub mod initialization;
pub mod metrics;
pub mod model;
pub mod optimization;
pub mod training;

pub use config::FactorConfig;
pub use data::{BatchFeeder, RatingRecord};
pub use error::{FactorErr, Result};
pub use model::{FactorModel, ModelParameters};
pub use training::TrainingLog;
